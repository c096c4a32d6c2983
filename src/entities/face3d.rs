//! 3DFACE entity, plus corner helpers shared with SOLID and TRACE

use super::{Entity, EntityCommon, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::Vector3;

/// Consume a corner coordinate record (codes 10..13 / 20..23 / 30..33)
/// into a four-corner array.
pub(crate) fn handle_corner_record(corners: &mut [Vector3; 4], record: &Record) -> bool {
    let code = record.group_code;
    if !(10..=33).contains(&code) {
        return false;
    }
    let corner = (code % 10) as usize;
    if corner > 3 {
        return false;
    }
    if let Some(v) = record.value.as_double() {
        match code / 10 {
            1 => corners[corner].x = v,
            2 => corners[corner].y = v,
            3 => corners[corner].z = v,
            _ => return false,
        }
        return true;
    }
    false
}

/// Corner fields exposed back through the generic record interface.
pub(crate) fn corner_field_record(corners: &[Vector3; 4], group_code: i32) -> Option<Value> {
    if !(10..=33).contains(&group_code) {
        return None;
    }
    let corner = (group_code % 10) as usize;
    if corner > 3 {
        return None;
    }
    let v = match group_code / 10 {
        1 => corners[corner].x,
        2 => corners[corner].y,
        3 => corners[corner].z,
        _ => return None,
    };
    Some(Value::Double(v))
}

/// Write the four corners as 10..13 / 20..23 / 30..33 triples.
pub(crate) fn write_corners(corners: &[Vector3; 4], output: &mut Output<'_>) -> Result<()> {
    for (i, corner) in corners.iter().enumerate() {
        output.write_point(10 + i as i32, *corner)?;
    }
    Ok(())
}

/// A 3DFACE entity: four corner points and edge-visibility flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Face3D {
    /// Common entity data
    pub common: EntityCommon,
    /// Corner points (codes 10..13, 20..23, 30..33)
    pub corners: [Vector3; 4],
    /// Invisible-edge flags (code 70): bit n hides edge n
    pub flags: i16,
    records: Vec<Record>,
}

impl Face3D {
    /// Create a degenerate face at the origin.
    pub fn new() -> Self {
        Face3D {
            common: EntityCommon::new(),
            corners: [Vector3::ZERO; 4],
            flags: 0,
            records: Vec::new(),
        }
    }

    /// Whether this face is a triangle (fourth corner repeats the
    /// third).
    pub fn is_triangle(&self) -> bool {
        self.corners[2] == self.corners[3]
    }
}

impl Default for Face3D {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Face3D {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn handle_record(&mut self, record: &Record) -> bool {
        if handle_corner_record(&mut self.corners, record) {
            return true;
        }
        if record.group_code == 70 {
            if let Some(v) = record.value.as_int() {
                self.flags = v as i16;
                return true;
            }
        }
        self.common.handle_common_record(record)
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        if let Some(v) = corner_field_record(&self.corners, group_code) {
            return Some(v);
        }
        match group_code {
            70 => Some(Value::Int16(self.flags)),
            _ => self.common.field_record(group_code),
        }
    }

    fn should_write_record(&self, group_code: i32) -> bool {
        !self.common.suppresses(group_code)
    }

    fn reserved_record(&self, group_code: i32) -> bool {
        group_code == 8
    }
}

impl Entity for Face3D {
    fn entity_name(&self) -> &str {
        "3DFACE"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        write_corners(&self.corners, output)?;
        if self.flags != 0 {
            output.write_i16(70, self.flags)?;
        }
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        self.common.count_records(&self.records)
            + 12
            + usize::from(self.flags != 0)
            + self.count_retained()
    }

    fn extract_geometry(
        &self,
        _params: &TessellationParams,
        geometry: &mut Geometry,
    ) -> GeometryKind {
        geometry.vertices.push(self.corners[0]);
        geometry.vertices.push(self.corners[1]);
        geometry.vertices.push(self.corners[2]);
        if !self.is_triangle() {
            geometry.vertices.push(self.corners[3]);
        }
        GeometryKind::Polygons
    }
}
