//! Circle entity

use super::{Entity, EntityCommon, Extrusion, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::Vector3;

/// A circle entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    /// Common entity data
    pub common: EntityCommon,
    /// Center (codes 10/20/30)
    pub center: Vector3,
    /// Radius (code 40)
    pub radius: f64,
    /// Thickness and extrusion direction
    pub extrusion: Extrusion,
    records: Vec<Record>,
}

impl Circle {
    /// Create a unit-less circle at the origin.
    pub fn new() -> Self {
        Circle {
            common: EntityCommon::new(),
            center: Vector3::ZERO,
            radius: 0.0,
            extrusion: Extrusion::new(),
            records: Vec::new(),
        }
    }

    /// Create a circle from center and radius.
    pub fn from_center_radius(center: Vector3, radius: f64) -> Self {
        Circle {
            center,
            radius,
            ..Self::new()
        }
    }

    /// Number of segments a full circle tessellates into.
    ///
    /// A positive override wins; otherwise the count is derived from
    /// the chord error bound and clamped to at least 3.
    pub fn segment_count(&self, params: &TessellationParams) -> usize {
        segment_count_for_radius(self.radius, params)
    }
}

/// Segment count for tessellating a full circle of radius `r`.
pub(crate) fn segment_count_for_radius(r: f64, params: &TessellationParams) -> usize {
    if params.segment_override > 0 {
        return params.segment_override as usize;
    }
    let error = params.max_chord_error;
    if r > error && error > 0.0 {
        let inner = r - error;
        let half_chord = (r * r - inner * inner).sqrt();
        let n = (std::f64::consts::PI / (half_chord / inner).atan()).ceil() as usize;
        n.max(3)
    } else {
        3
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Circle {
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

impl Entity for Circle {
    fn entity_name(&self) -> &str {
        "CIRCLE"
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
        self.extrusion.write(output)?;
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        self.common.count_records(&self.records)
            + 4
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
        let n = self.segment_count(params);
        for i in 0..n {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            geometry.vertices.push(Vector3::new(
                self.center.x + self.radius * angle.cos(),
                self.center.y + self.radius * angle.sin(),
                self.center.z,
            ));
        }
        // Close the loop.
        geometry.vertices.push(geometry.vertices[0]);
        GeometryKind::Lines
    }
}
