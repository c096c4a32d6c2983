//! Line entity

use super::{Entity, EntityCommon, Extrusion, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::Vector3;

/// A line entity defined by two endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Common entity data
    pub common: EntityCommon,
    /// Start point of the line (codes 10/20/30)
    pub start: Vector3,
    /// End point of the line (codes 11/21/31)
    pub end: Vector3,
    /// Thickness and extrusion direction
    pub extrusion: Extrusion,
    records: Vec<Record>,
}

impl Line {
    /// Create a new line from origin to origin.
    pub fn new() -> Self {
        Line {
            common: EntityCommon::new(),
            start: Vector3::ZERO,
            end: Vector3::ZERO,
            extrusion: Extrusion::new(),
            records: Vec::new(),
        }
    }

    /// Create a new line between two points.
    pub fn from_points(start: Vector3, end: Vector3) -> Self {
        Line {
            start,
            end,
            ..Self::new()
        }
    }

    /// The length of the line.
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Line {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn handle_record(&mut self, record: &Record) -> bool {
        if let Some(v) = record.value.as_double() {
            match record.group_code {
                10 => {
                    self.start.x = v;
                    return true;
                }
                20 => {
                    self.start.y = v;
                    return true;
                }
                30 => {
                    self.start.z = v;
                    return true;
                }
                11 => {
                    self.end.x = v;
                    return true;
                }
                21 => {
                    self.end.y = v;
                    return true;
                }
                31 => {
                    self.end.z = v;
                    return true;
                }
                _ => {}
            }
        }
        self.extrusion.handle_record(record) || self.common.handle_common_record(record)
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            10 => Some(Value::Double(self.start.x)),
            20 => Some(Value::Double(self.start.y)),
            30 => Some(Value::Double(self.start.z)),
            11 => Some(Value::Double(self.end.x)),
            21 => Some(Value::Double(self.end.y)),
            31 => Some(Value::Double(self.end.z)),
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

impl Entity for Line {
    fn entity_name(&self) -> &str {
        "LINE"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        output.write_point(10, self.start)?;
        output.write_point(11, self.end)?;
        self.extrusion.write(output)?;
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        self.common.count_records(&self.records)
            + 6
            + self.extrusion.count_records()
            + self.count_retained()
    }

    fn extract_geometry(
        &self,
        _params: &TessellationParams,
        geometry: &mut Geometry,
    ) -> GeometryKind {
        geometry.extrusion = self.extrusion.direction;
        geometry.thickness = self.extrusion.thickness;
        geometry.vertices.push(self.start);
        geometry.vertices.push(self.end);
        GeometryKind::Lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_creation() {
        let line = Line::new();
        assert_eq!(line.start, Vector3::ZERO);
        assert_eq!(line.end, Vector3::ZERO);
        assert_eq!(line.entity_name(), "LINE");
    }

    #[test]
    fn test_line_length() {
        let line = Line::from_points(Vector3::ZERO, Vector3::new(3.0, 4.0, 0.0));
        assert_eq!(line.length(), 5.0);
    }

    #[test]
    fn test_handle_record_endpoints() {
        let mut line = Line::new();
        assert!(line.handle_record(&Record::new(10, Value::Double(1.0))));
        assert!(line.handle_record(&Record::new(21, Value::Double(2.0))));
        assert_eq!(line.start.x, 1.0);
        assert_eq!(line.end.y, 2.0);
        assert_eq!(line.get_record(10), Some(Value::Double(1.0)));
    }

    #[test]
    fn test_count_matches_write() {
        let mut line = Line::from_points(Vector3::ZERO, Vector3::new(10.0, 5.0, 2.0));
        line.extrusion.thickness = 1.0;
        let mut buf = Vec::new();
        {
            let mut out = Output::new(&mut buf);
            line.write(&mut out).unwrap();
            assert_eq!(out.written_records(), line.count_records());
        }
    }

    #[test]
    fn test_extract_geometry() {
        let line = Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        let mut geometry = Geometry::new();
        let kind = line.extract_geometry(&TessellationParams::default(), &mut geometry);
        assert_eq!(kind, GeometryKind::Lines);
        assert_eq!(geometry.vertices.len(), 2);
    }

    #[test]
    fn test_layer_setter_reserved() {
        let mut line = Line::new();
        assert!(line.set_record(8, Value::Text("L".into())).is_err());
    }
}
