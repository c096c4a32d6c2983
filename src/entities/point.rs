//! Point entity

use super::{Entity, EntityCommon, Extrusion, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::Vector3;

/// A point entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Common entity data
    pub common: EntityCommon,
    /// Location (codes 10/20/30)
    pub coords: Vector3,
    /// Optional elevation override (code 38)
    pub elevation: Option<f64>,
    /// Thickness and extrusion direction
    pub extrusion: Extrusion,
    records: Vec<Record>,
}

impl Point {
    /// Create a point at the origin.
    pub fn new() -> Self {
        Point {
            common: EntityCommon::new(),
            coords: Vector3::ZERO,
            elevation: None,
            extrusion: Extrusion::new(),
            records: Vec::new(),
        }
    }

    /// Create a point at a location.
    pub fn at(coords: Vector3) -> Self {
        Point {
            coords,
            ..Self::new()
        }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Point {
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
                    self.coords.x = v;
                    return true;
                }
                20 => {
                    self.coords.y = v;
                    return true;
                }
                30 => {
                    self.coords.z = v;
                    return true;
                }
                38 => {
                    self.elevation = Some(v);
                    return true;
                }
                _ => {}
            }
        }
        self.extrusion.handle_record(record) || self.common.handle_common_record(record)
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            10 => Some(Value::Double(self.coords.x)),
            20 => Some(Value::Double(self.coords.y)),
            30 => Some(Value::Double(self.coords.z)),
            38 => self.elevation.map(Value::Double),
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

impl Entity for Point {
    fn entity_name(&self) -> &str {
        "POINT"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        output.write_point(10, self.coords)?;
        if let Some(elevation) = self.elevation {
            output.write_f64(38, elevation)?;
        }
        self.extrusion.write(output)?;
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        self.common.count_records(&self.records)
            + 3
            + usize::from(self.elevation.is_some())
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
        geometry.vertices.push(self.coords);
        if self.extrusion.thickness != 0.0 {
            // Thickness turns the point into a line along the extrusion
            // direction.
            geometry
                .vertices
                .push(self.coords + self.extrusion.direction * self.extrusion.thickness);
            GeometryKind::Lines
        } else {
            GeometryKind::Points
        }
    }
}
