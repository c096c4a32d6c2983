//! Handle type for DXF objects
//!
//! Handles are hex-string identifiers attached to entities on group
//! code 5. The model tracks the largest one seen so freshly issued
//! handles stay unique within the file.

use std::fmt;

/// A numeric DXF handle.
///
/// Stored as a 64-bit unsigned integer; the wire representation is a
/// hexadecimal string. Handle 0 is the null handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Handle(u64);

impl Handle {
    /// The null handle (0)
    pub const NULL: Handle = Handle(0);

    /// Create a new handle from a u64 value
    #[inline]
    pub const fn new(value: u64) -> Self {
        Handle(value)
    }

    /// Parse a handle from its hexadecimal wire form.
    ///
    /// Returns `None` if the string is not valid hex.
    pub fn from_hex(s: &str) -> Option<Self> {
        u64::from_str_radix(s.trim(), 16).ok().map(Handle)
    }

    /// Get the raw u64 value
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Check if this is the null handle
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Format as a lowercase hexadecimal string (the form new handles
    /// are written in)
    pub fn to_hex(&self) -> String {
        format!("{:x}", self.0)
    }
}

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Handle(value)
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::LowerHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_creation() {
        let handle = Handle::new(0x1234);
        assert_eq!(handle.value(), 0x1234);
    }

    #[test]
    fn test_null_handle() {
        assert!(Handle::NULL.is_null());
        assert_eq!(Handle::default(), Handle::NULL);
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Handle::from_hex("FF"), Some(Handle::new(255)));
        assert_eq!(Handle::from_hex("ff"), Some(Handle::new(255)));
        assert_eq!(Handle::from_hex(" 10 "), Some(Handle::new(16)));
        assert_eq!(Handle::from_hex("xyz"), None);
    }

    #[test]
    fn test_to_hex_is_lowercase() {
        assert_eq!(Handle::new(0xABCD).to_hex(), "abcd");
        assert_eq!(format!("{}", Handle::new(257)), "101");
    }

    #[test]
    fn test_handle_ordering() {
        assert!(Handle::new(100) < Handle::new(200));
    }
}
