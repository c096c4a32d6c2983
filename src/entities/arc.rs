//! Arc entity

use super::circle::segment_count_for_radius;
use super::{Entity, EntityCommon, Extrusion, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::Vector3;

/// A circular arc entity. Angles are in degrees, counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    /// Common entity data
    pub common: EntityCommon,
    /// Center (codes 10/20/30)
    pub center: Vector3,
    /// Radius (code 40)
    pub radius: f64,
    /// Start angle in degrees (code 50)
    pub start_angle: f64,
    /// End angle in degrees (code 51)
    pub end_angle: f64,
    /// Thickness and extrusion direction
    pub extrusion: Extrusion,
    records: Vec<Record>,
}

impl Arc {
    /// Create an empty arc at the origin.
    pub fn new() -> Self {
        Arc {
            common: EntityCommon::new(),
            center: Vector3::ZERO,
            radius: 0.0,
            start_angle: 0.0,
            end_angle: 0.0,
            extrusion: Extrusion::new(),
            records: Vec::new(),
        }
    }

    /// The swept angle in degrees. An end angle below the start angle
    /// wraps by a full turn; coincident angles sweep a full circle.
    pub fn sweep(&self) -> f64 {
        let mut end = self.end_angle;
        if end < self.start_angle {
            end += 360.0;
        }
        let sweep = end - self.start_angle;
        if sweep == 0.0 {
            360.0
        } else {
            sweep
        }
    }
}

impl Default for Arc {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Arc {
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
                    self.center.x = v;
                    return true;
                }
                20 => {
                    self.center.y = v;
                    return true;
                }
                30 => {
                    self.center.z = v;
                    return true;
                }
                40 => {
                    self.radius = v;
                    return true;
                }
                50 => {
                    self.start_angle = v;
                    return true;
                }
                51 => {
                    self.end_angle = v;
                    return true;
                }
                _ => {}
            }
        }
        self.extrusion.handle_record(record) || self.common.handle_common_record(record)
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            10 => Some(Value::Double(self.center.x)),
            20 => Some(Value::Double(self.center.y)),
            30 => Some(Value::Double(self.center.z)),
            40 => Some(Value::Double(self.radius)),
            50 => Some(Value::Double(self.start_angle)),
            51 => Some(Value::Double(self.end_angle)),
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

impl Entity for Arc {
    fn entity_name(&self) -> &str {
        "ARC"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        output.write_point(10, self.center)?;
        output.write_f64(40, self.radius)?;
        output.write_f64(50, self.start_angle)?;
        output.write_f64(51, self.end_angle)?;
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
        params: &TessellationParams,
        geometry: &mut Geometry,
    ) -> GeometryKind {
        geometry.extrusion = self.extrusion.direction;
        geometry.thickness = self.extrusion.thickness;
        if self.radius <= 0.0 {
            return GeometryKind::None;
        }
        let sweep = self.sweep();
        let full = segment_count_for_radius(self.radius, params);
        let segments = ((full as f64 * sweep / 360.0).ceil() as usize).max(1);
        for i in 0..=segments {
            let angle = (self.start_angle + sweep * i as f64 / segments as f64).to_radians();
            geometry.vertices.push(Vector3::new(
                self.center.x + self.radius * angle.cos(),
                self.center.y + self.radius * angle.sin(),
                self.center.z,
            ));
        }
        GeometryKind::Lines
    }
}
