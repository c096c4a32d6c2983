//! MText entity

use super::{Entity, EntityCommon, Extrusion, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::Vector3;

/// Maximum characters per continuation chunk (group code 3).
const CHUNK_LEN: usize = 250;

/// Attachment point of an MTEXT box, group code 71.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentPoint {
    #[default]
    None,
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl AttachmentPoint {
    /// Decode group code 71; out-of-range values map to `None`.
    pub fn from_i16(value: i16) -> Self {
        match value {
            1 => AttachmentPoint::TopLeft,
            2 => AttachmentPoint::TopCenter,
            3 => AttachmentPoint::TopRight,
            4 => AttachmentPoint::MiddleLeft,
            5 => AttachmentPoint::MiddleCenter,
            6 => AttachmentPoint::MiddleRight,
            7 => AttachmentPoint::BottomLeft,
            8 => AttachmentPoint::BottomCenter,
            9 => AttachmentPoint::BottomRight,
            _ => AttachmentPoint::None,
        }
    }

    /// Encode for group code 71.
    pub fn to_i16(self) -> i16 {
        match self {
            AttachmentPoint::None => 0,
            AttachmentPoint::TopLeft => 1,
            AttachmentPoint::TopCenter => 2,
            AttachmentPoint::TopRight => 3,
            AttachmentPoint::MiddleLeft => 4,
            AttachmentPoint::MiddleCenter => 5,
            AttachmentPoint::MiddleRight => 6,
            AttachmentPoint::BottomLeft => 7,
            AttachmentPoint::BottomCenter => 8,
            AttachmentPoint::BottomRight => 9,
        }
    }
}

/// A multi-line MTEXT entity.
///
/// The payload is reconstructed from the repeated 250-character chunks
/// on group code 3 followed by the final chunk on group code 1, and
/// split back the same way on write.
#[derive(Debug, Clone, PartialEq)]
pub struct MText {
    /// Common entity data
    pub common: EntityCommon,
    /// Insertion point (codes 10/20/30)
    pub origin: Vector3,
    /// Nominal text height (code 40)
    pub height: f64,
    /// Reference rectangle width (code 41)
    pub box_width: f64,
    /// Attachment point (code 71)
    pub attachment: AttachmentPoint,
    /// Drawing direction (code 72)
    pub drawing_direction: i16,
    /// Text style name (code 7)
    pub style: Option<String>,
    /// X-axis direction vector (codes 11/21/31)
    pub x_axis: Option<Vector3>,
    /// Horizontal width of the characters (code 42, output-only in the
    /// interchange format, echoed when present)
    pub char_width: Option<f64>,
    /// Vertical height of the characters (code 43, echoed when present)
    pub char_height: Option<f64>,
    /// Rotation angle in radians (code 50)
    pub rotation: f64,
    /// Line spacing style (code 73)
    pub line_spacing_style: i16,
    /// Line spacing factor (code 44)
    pub line_spacing_factor: Option<f64>,
    /// Thickness and extrusion direction
    pub extrusion: Extrusion,
    text: String,
    /// Accumulated continuation chunks while reading
    pending_chunks: String,
    records: Vec<Record>,
}

impl MText {
    /// Create an empty mtext entity.
    pub fn new() -> Self {
        MText {
            common: EntityCommon::new(),
            origin: Vector3::ZERO,
            height: 0.0,
            box_width: 0.0,
            attachment: AttachmentPoint::None,
            drawing_direction: 0,
            style: None,
            x_axis: None,
            char_width: None,
            char_height: None,
            rotation: 0.0,
            line_spacing_style: 0,
            line_spacing_factor: None,
            extrusion: Extrusion::new(),
            text: String::new(),
            pending_chunks: String::new(),
            records: Vec::new(),
        }
    }

    /// The full text payload.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the full text payload.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.pending_chunks.clear();
    }

    /// Split the payload into continuation chunks plus the final chunk.
    fn chunks(&self) -> (Vec<String>, String) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut continuation = Vec::new();
        let mut start = 0;
        while chars.len() - start > CHUNK_LEN {
            continuation.push(chars[start..start + CHUNK_LEN].iter().collect());
            start += CHUNK_LEN;
        }
        (continuation, chars[start..].iter().collect())
    }
}

impl Default for MText {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for MText {
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
                    self.text = std::mem::take(&mut self.pending_chunks);
                    self.text.push_str(s);
                    return true;
                }
                false
            }
            3 => {
                if let Some(s) = record.value.as_str() {
                    self.pending_chunks.push_str(s);
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
                    let mut axis = self.x_axis.unwrap_or(Vector3::ZERO);
                    match record.group_code {
                        11 => axis.x = v,
                        21 => axis.y = v,
                        _ => axis.z = v,
                    }
                    self.x_axis = Some(axis);
                    return true;
                }
                false
            }
            40 => {
                if let Some(v) = record.value.as_double() {
                    self.height = v;
                    return true;
                }
                false
            }
            41 => {
                if let Some(v) = record.value.as_double() {
                    self.box_width = v;
                    return true;
                }
                false
            }
            42 => {
                if let Some(v) = record.value.as_double() {
                    self.char_width = Some(v);
                    return true;
                }
                false
            }
            43 => {
                if let Some(v) = record.value.as_double() {
                    self.char_height = Some(v);
                    return true;
                }
                false
            }
            44 => {
                if let Some(v) = record.value.as_double() {
                    self.line_spacing_factor = Some(v);
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
            7 => {
                if let Some(s) = record.value.as_str() {
                    self.style = Some(s.to_string());
                    return true;
                }
                false
            }
            71 => {
                if let Some(v) = record.value.as_int() {
                    self.attachment = AttachmentPoint::from_i16(v as i16);
                    return true;
                }
                false
            }
            72 => {
                if let Some(v) = record.value.as_int() {
                    self.drawing_direction = v as i16;
                    return true;
                }
                false
            }
            73 => {
                if let Some(v) = record.value.as_int() {
                    self.line_spacing_style = v as i16;
                    return true;
                }
                false
            }
            100 => {
                if record.value.as_str() == Some("AcDbMText") {
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
            11 => self.x_axis.map(|a| Value::Double(a.x)),
            21 => self.x_axis.map(|a| Value::Double(a.y)),
            31 => self.x_axis.map(|a| Value::Double(a.z)),
            40 => Some(Value::Double(self.height)),
            41 => Some(Value::Double(self.box_width)),
            42 => self.char_width.map(Value::Double),
            43 => self.char_height.map(Value::Double),
            44 => self.line_spacing_factor.map(Value::Double),
            50 => Some(Value::Double(self.rotation)),
            7 => self.style.clone().map(Value::Text),
            71 => Some(Value::Int16(self.attachment.to_i16())),
            72 => Some(Value::Int16(self.drawing_direction)),
            73 => Some(Value::Int16(self.line_spacing_style)),
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

impl Entity for MText {
    fn entity_name(&self) -> &str {
        "MTEXT"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        output.write_string(100, "AcDbMText")?;
        output.write_point(10, self.origin)?;
        output.write_f64(40, self.height)?;
        output.write_f64(41, self.box_width)?;
        if self.attachment != AttachmentPoint::None {
            output.write_i16(71, self.attachment.to_i16())?;
        }
        if self.drawing_direction != 0 {
            output.write_i16(72, self.drawing_direction)?;
        }
        let (continuation, last) = self.chunks();
        for chunk in &continuation {
            output.write_string(3, chunk)?;
        }
        output.write_string(1, &last)?;
        if let Some(style) = &self.style {
            output.write_string(7, style)?;
        }
        if let Some(axis) = self.x_axis {
            output.write_point(11, axis)?;
        }
        if let Some(char_width) = self.char_width {
            output.write_f64(42, char_width)?;
        }
        if let Some(char_height) = self.char_height {
            output.write_f64(43, char_height)?;
        }
        if self.rotation != 0.0 {
            output.write_f64(50, self.rotation)?;
        }
        if self.line_spacing_style != 0 {
            output.write_i16(73, self.line_spacing_style)?;
        }
        if let Some(factor) = self.line_spacing_factor {
            output.write_f64(44, factor)?;
        }
        self.extrusion.write(output)?;
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        let mut count = self.common.count_records(&self.records);
        count += 1; // AcDbMText marker
        count += 3; // origin
        count += 2; // height + box width
        if self.attachment != AttachmentPoint::None {
            count += 1;
        }
        if self.drawing_direction != 0 {
            count += 1;
        }
        let chars = self.text.chars().count();
        count += if chars > CHUNK_LEN {
            (chars - 1) / CHUNK_LEN + 1
        } else {
            1
        };
        if self.style.is_some() {
            count += 1;
        }
        if self.x_axis.is_some() {
            count += 3;
        }
        if self.char_width.is_some() {
            count += 1;
        }
        if self.char_height.is_some() {
            count += 1;
        }
        if self.rotation != 0.0 {
            count += 1;
        }
        if self.line_spacing_style != 0 {
            count += 1;
        }
        if self.line_spacing_factor.is_some() {
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
        if self.box_width <= 0.0 && self.height <= 0.0 {
            return GeometryKind::None;
        }
        geometry.vertices.push(self.origin);
        geometry
            .vertices
            .push(Vector3::new(self.origin.x + self.box_width, self.origin.y, 0.0));
        geometry.vertices.push(Vector3::new(
            self.origin.x + self.box_width,
            self.origin.y + self.height,
            0.0,
        ));
        geometry
            .vertices
            .push(Vector3::new(self.origin.x, self.origin.y + self.height, 0.0));
        geometry.vertices.push(self.origin);
        GeometryKind::Lines
    }
}
