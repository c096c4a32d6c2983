//! Text entity

use super::{Entity, EntityCommon, Extrusion, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::Vector3;

/// Character aspect ratio used when deriving the box width from the
/// height and string length.
const CHAR_ASPECT: f64 = 0.82;

/// Text-generation flag: mirrored in X.
pub const TEXT_FLIP_X: i16 = 2;

/// Text-generation flag: mirrored in Y.
pub const TEXT_FLIP_Y: i16 = 4;

/// A single-line TEXT entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// Common entity data
    pub common: EntityCommon,
    /// First alignment point (codes 10/20/30)
    pub origin: Vector3,
    /// Second alignment point (codes 11/21/31)
    pub second: Vector3,
    /// Whether the second alignment point was present
    pub have_second: bool,
    /// Text height (code 40)
    height: f64,
    /// Derived box width: height x 0.82 x length x width scale
    width: f64,
    /// Rotation angle in degrees (code 50)
    pub rotation: f64,
    /// Relative width scale factor (code 41); 0 when absent
    w_scale: f64,
    /// Horizontal justification (code 72)
    pub h_just: i16,
    /// Vertical justification (code 73)
    pub v_just: i16,
    /// Text generation flags (code 71): FlipX = 2, FlipY = 4
    pub text_generation: i16,
    /// The text payload (code 1)
    text: String,
    /// Thickness and extrusion direction
    pub extrusion: Extrusion,
    records: Vec<Record>,
}

impl Text {
    /// Create an empty text entity.
    pub fn new() -> Self {
        Text {
            common: EntityCommon::new(),
            origin: Vector3::ZERO,
            second: Vector3::ZERO,
            have_second: false,
            height: 0.0,
            width: 0.0,
            rotation: 0.0,
            w_scale: 0.0,
            h_just: 0,
            v_just: 0,
            text_generation: 0,
            text: String::new(),
            extrusion: Extrusion::new(),
            records: Vec::new(),
        }
    }

    /// The text payload.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the text payload and recompute the box width.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.update_width();
    }

    /// The text height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Set the text height and recompute the box width.
    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        self.update_width();
    }

    /// The relative width scale factor; 0 when absent.
    pub fn w_scale(&self) -> f64 {
        self.w_scale
    }

    /// The derived box width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Set the flip flags (code 71 bits).
    pub fn set_text_generation(&mut self, flip_x: bool, flip_y: bool) {
        self.text_generation =
            if flip_x { TEXT_FLIP_X } else { 0 } | if flip_y { TEXT_FLIP_Y } else { 0 };
    }

    fn update_width(&mut self) {
        self.width = self.height * CHAR_ASPECT * self.text.chars().count() as f64;
        if self.w_scale != 0.0 {
            self.width *= self.w_scale;
        }
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Text {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn handle_record(&mut self, record: &Record) -> bool {
        match record.group_code {
            1 => {
                if let Some(s) = record.value.as_str() {
                    self.text = s.to_string();
                    self.update_width();
                    return true;
                }
                false
            }
            10 | 20 | 30 => {
                if let Some(v) = record.value.as_double() {
                    match record.group_code {
                        10 => self.origin.x = v,
                        20 => self.origin.y = v,
                        _ => self.origin.z = v,
                    }
                    return true;
                }
                false
            }
            11 | 21 | 31 => {
                if let Some(v) = record.value.as_double() {
                    match record.group_code {
                        11 => self.second.x = v,
                        21 => self.second.y = v,
                        _ => self.second.z = v,
                    }
                    self.have_second = true;
                    return true;
                }
                false
            }
            40 => {
                if let Some(v) = record.value.as_double() {
                    self.height = v;
                    self.update_width();
                    return true;
                }
                false
            }
            41 => {
                if let Some(v) = record.value.as_double() {
                    self.w_scale = v;
                    self.update_width();
                    return true;
                }
                false
            }
            50 => {
                if let Some(v) = record.value.as_double() {
                    self.rotation = v;
                    return true;
                }
                false
            }
            71 => {
                if let Some(v) = record.value.as_int() {
                    self.text_generation = v as i16;
                    return true;
                }
                false
            }
            72 => {
                if let Some(v) = record.value.as_int() {
                    self.h_just = v as i16;
                    return true;
                }
                false
            }
            73 => {
                if let Some(v) = record.value.as_int() {
                    self.v_just = v as i16;
                    return true;
                }
                false
            }
            100 => {
                // Eat the AcDbText markers; the writer places them
                // itself.
                if record.value.as_str() == Some("AcDbText") {
                    return true;
                }
                self.common.handle_common_record(record)
            }
            _ => {
                self.extrusion.handle_record(record) || self.common.handle_common_record(record)
            }
        }
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            1 => Some(Value::Text(self.text.clone())),
            10 => Some(Value::Double(self.origin.x)),
            20 => Some(Value::Double(self.origin.y)),
            30 => Some(Value::Double(self.origin.z)),
            11 => self.have_second.then(|| Value::Double(self.second.x)),
            21 => self.have_second.then(|| Value::Double(self.second.y)),
            31 => self.have_second.then(|| Value::Double(self.second.z)),
            40 => Some(Value::Double(self.height)),
            41 => (self.w_scale != 0.0).then(|| Value::Double(self.w_scale)),
            50 => Some(Value::Double(self.rotation)),
            71 => Some(Value::Int16(self.text_generation)),
            72 => Some(Value::Int16(self.h_just)),
            73 => Some(Value::Int16(self.v_just)),
            _ => self
                .extrusion
                .field_record(group_code)
                .or_else(|| self.common.field_record(group_code)),
        }
    }

    fn should_write_record(&self, group_code: i32) -> bool {
        !self.common.suppresses(group_code)
    }

    fn reserved_record(&self, group_code: i32) -> bool {
        group_code == 8
    }
}

impl Entity for Text {
    fn entity_name(&self) -> &str {
        "TEXT"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        output.write_string(100, "AcDbText")?;
        output.write_string(1, &self.text)?;
        output.write_point(10, self.origin)?;
        output.write_f64(40, self.height)?;
        if self.w_scale != 0.0 {
            output.write_f64(41, self.w_scale)?;
        }
        if self.rotation != 0.0 {
            output.write_f64(50, self.rotation)?;
        }
        if self.text_generation != 0 {
            output.write_i16(71, self.text_generation)?;
        }
        if self.h_just != 0 {
            output.write_i16(72, self.h_just)?;
        }
        if self.have_second {
            output.write_point(11, self.second)?;
        }
        // The vertical justification lives in a second AcDbText
        // subclass block.
        output.write_string(100, "AcDbText")?;
        if self.v_just != 0 {
            output.write_i16(73, self.v_just)?;
        }
        self.extrusion.write(output)?;
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        let mut count = self.common.count_records(&self.records);
        count += 2; // the two AcDbText markers
        count += 1; // text
        count += 3; // origin
        count += 1; // height
        if self.w_scale != 0.0 {
            count += 1;
        }
        if self.rotation != 0.0 {
            count += 1;
        }
        if self.text_generation != 0 {
            count += 1;
        }
        if self.h_just != 0 {
            count += 1;
        }
        if self.have_second {
            count += 3;
        }
        if self.v_just != 0 {
            count += 1;
        }
        count + self.extrusion.count_records() + self.count_retained()
    }

    fn extract_geometry(
        &self,
        _params: &TessellationParams,
        geometry: &mut Geometry,
    ) -> GeometryKind {
        geometry.extrusion = self.extrusion.direction;
        geometry.thickness = self.extrusion.thickness;
        // The corners of the box around the text, loop closed.
        geometry.vertices.push(self.origin);
        geometry
            .vertices
            .push(Vector3::new(self.origin.x + self.width, self.origin.y, 0.0));
        geometry.vertices.push(Vector3::new(
            self.origin.x + self.width,
            self.origin.y + self.height,
            0.0,
        ));
        geometry
            .vertices
            .push(Vector3::new(self.origin.x, self.origin.y + self.height, 0.0));
        geometry.vertices.push(self.origin);
        if self.extrusion.thickness == 0.0 {
            GeometryKind::Lines
        } else {
            GeometryKind::Polygons
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_tracks_text_and_height() {
        let mut text = Text::new();
        text.set_height(2.0);
        text.set_text("hello");
        assert!((text.width() - 2.0 * CHAR_ASPECT * 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_width_applies_scale() {
        let mut text = Text::new();
        text.handle_record(&Record::new(41, Value::Double(0.5)));
        text.set_height(1.0);
        text.set_text("abcd");
        assert!((text.width() - 1.0 * CHAR_ASPECT * 4.0 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_second_point_tracked() {
        let mut text = Text::new();
        assert!(!text.have_second);
        text.handle_record(&Record::new(11, Value::Double(4.0)));
        assert!(text.have_second);
        assert_eq!(text.get_record(11), Some(Value::Double(4.0)));
    }

    #[test]
    fn test_acdbtext_markers_eaten() {
        let mut text = Text::new();
        assert!(text.handle_record(&Record::new(100, Value::Text("AcDbText".into()))));
        assert!(text.handle_record(&Record::new(100, Value::Text("AcDbEntity".into()))));
        assert!(text.retained_records().is_empty());
    }

    #[test]
    fn test_flip_flags() {
        let mut text = Text::new();
        text.set_text_generation(true, true);
        assert_eq!(text.text_generation, TEXT_FLIP_X | TEXT_FLIP_Y);
    }

    #[test]
    fn test_count_matches_write() {
        let mut text = Text::new();
        text.set_height(2.5);
        text.set_text("sample");
        text.rotation = 45.0;
        text.h_just = 1;
        text.v_just = 2;
        text.have_second = true;
        text.second = Vector3::new(1.0, 1.0, 0.0);
        let mut buf = Vec::new();
        {
            let mut out = Output::new(&mut buf);
            text.write(&mut out).unwrap();
            assert_eq!(out.written_records(), text.count_records());
        }
    }
}
