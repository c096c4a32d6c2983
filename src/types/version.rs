//! DXF drawing database version
//!
//! The HEADER variable `$ACADVER` carries an `ACxxxx` string naming the
//! AutoCAD release that produced the drawing.

use std::fmt;

/// AutoCAD drawing database version, decoded from `$ACADVER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DxfVersion {
    /// AC1006
    R10,
    /// AC1009
    R11R12,
    /// AC1012
    R13,
    /// AC1013
    R14,
    /// AC1015
    R2000,
    /// AC1018
    R2004,
    /// AC1021
    R2007,
    /// AC1024
    R2010,
}

impl DxfVersion {
    /// Decode an `$ACADVER` value. Returns `None` for unknown strings.
    pub fn from_acadver(s: &str) -> Option<Self> {
        match s.trim() {
            "AC1006" => Some(DxfVersion::R10),
            "AC1009" => Some(DxfVersion::R11R12),
            "AC1012" => Some(DxfVersion::R13),
            "AC1013" => Some(DxfVersion::R14),
            "AC1015" => Some(DxfVersion::R2000),
            "AC1018" => Some(DxfVersion::R2004),
            "AC1021" => Some(DxfVersion::R2007),
            "AC1024" => Some(DxfVersion::R2010),
            _ => None,
        }
    }

    /// The `$ACADVER` string for this version.
    pub fn acadver(&self) -> &'static str {
        match self {
            DxfVersion::R10 => "AC1006",
            DxfVersion::R11R12 => "AC1009",
            DxfVersion::R13 => "AC1012",
            DxfVersion::R14 => "AC1013",
            DxfVersion::R2000 => "AC1015",
            DxfVersion::R2004 => "AC1018",
            DxfVersion::R2007 => "AC1021",
            DxfVersion::R2010 => "AC1024",
        }
    }

    /// Human-readable release name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DxfVersion::R10 => "r10",
            DxfVersion::R11R12 => "r11/r12",
            DxfVersion::R13 => "r13",
            DxfVersion::R14 => "r14",
            DxfVersion::R2000 => "AutoCAD 2000",
            DxfVersion::R2004 => "AutoCAD 2004",
            DxfVersion::R2007 => "AutoCAD 2007",
            DxfVersion::R2010 => "AutoCAD 2010",
        }
    }
}

impl fmt::Display for DxfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_versions() {
        assert_eq!(DxfVersion::from_acadver("AC1006"), Some(DxfVersion::R10));
        assert_eq!(DxfVersion::from_acadver("AC1009"), Some(DxfVersion::R11R12));
        assert_eq!(DxfVersion::from_acadver("AC1012"), Some(DxfVersion::R13));
        assert_eq!(DxfVersion::from_acadver("AC1013"), Some(DxfVersion::R14));
        assert_eq!(DxfVersion::from_acadver("AC1015"), Some(DxfVersion::R2000));
        assert_eq!(DxfVersion::from_acadver("AC1018"), Some(DxfVersion::R2004));
        assert_eq!(DxfVersion::from_acadver("AC1021"), Some(DxfVersion::R2007));
        assert_eq!(DxfVersion::from_acadver("AC1024"), Some(DxfVersion::R2010));
    }

    #[test]
    fn test_unknown_version() {
        assert_eq!(DxfVersion::from_acadver("AC9999"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DxfVersion::R11R12.to_string(), "r11/r12");
        assert_eq!(DxfVersion::R2000.to_string(), "AutoCAD 2000");
    }
}
