//! Ellipse entity

use super::{Entity, EntityCommon, Extrusion, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::Vector3;

/// An ellipse entity. The major axis is stored as an endpoint vector
/// relative to the center; start/end parameters are in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    /// Common entity data
    pub common: EntityCommon,
    /// Center (codes 10/20/30)
    pub center: Vector3,
    /// Endpoint of the major axis, relative to the center (codes
    /// 11/21/31)
    pub major_axis_endpoint: Vector3,
    /// Ratio of minor to major axis (code 40)
    pub ratio: f64,
    /// Start parameter in radians (code 41); 0 for a full ellipse
    pub start_param: f64,
    /// End parameter in radians (code 42); 2π for a full ellipse
    pub end_param: f64,
    /// Thickness and extrusion direction
    pub extrusion: Extrusion,
    records: Vec<Record>,
}

impl Ellipse {
    /// Create an empty ellipse.
    pub fn new() -> Self {
        Ellipse {
            common: EntityCommon::new(),
            center: Vector3::ZERO,
            major_axis_endpoint: Vector3::ZERO,
            ratio: 1.0,
            start_param: 0.0,
            end_param: 2.0 * std::f64::consts::PI,
            extrusion: Extrusion::new(),
            records: Vec::new(),
        }
    }
}

impl Default for Ellipse {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Ellipse {
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
                11 => {
                    self.major_axis_endpoint.x = v;
                    return true;
                }
                21 => {
                    self.major_axis_endpoint.y = v;
                    return true;
                }
                31 => {
                    self.major_axis_endpoint.z = v;
                    return true;
                }
                40 => {
                    self.ratio = v;
                    return true;
                }
                41 => {
                    self.start_param = v;
                    return true;
                }
                42 => {
                    self.end_param = v;
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
            11 => Some(Value::Double(self.major_axis_endpoint.x)),
            21 => Some(Value::Double(self.major_axis_endpoint.y)),
            31 => Some(Value::Double(self.major_axis_endpoint.z)),
            40 => Some(Value::Double(self.ratio)),
            41 => Some(Value::Double(self.start_param)),
            42 => Some(Value::Double(self.end_param)),
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

impl Entity for Ellipse {
    fn entity_name(&self) -> &str {
        "ELLIPSE"
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
        output.write_point(11, self.major_axis_endpoint)?;
        output.write_f64(40, self.ratio)?;
        output.write_f64(41, self.start_param)?;
        output.write_f64(42, self.end_param)?;
        self.extrusion.write(output)?;
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        self.common.count_records(&self.records)
            + 9
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
        let major_len = self.major_axis_endpoint.length();
        if major_len <= 0.0 {
            return GeometryKind::None;
        }
        let major = self.major_axis_endpoint;
        // Minor axis: perpendicular to the major axis in the entity
        // plane, scaled by the ratio.
        let minor = self.extrusion.direction.cross(&major).normalize() * (major_len * self.ratio);

        let full = super::circle::segment_count_for_radius(major_len, params);
        let sweep = if self.end_param > self.start_param {
            self.end_param - self.start_param
        } else {
            self.end_param + 2.0 * std::f64::consts::PI - self.start_param
        };
        let segments = ((full as f64 * sweep / (2.0 * std::f64::consts::PI)).ceil() as usize).max(1);
        for i in 0..=segments {
            let t = self.start_param + sweep * i as f64 / segments as f64;
            geometry
                .vertices
                .push(self.center + major * t.cos() + minor * t.sin());
        }
        GeometryKind::Lines
    }
}
