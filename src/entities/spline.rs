//! Spline entity

use super::{Entity, EntityCommon, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::Vector3;
use bitflags::bitflags;

bitflags! {
    /// SPLINE flags, group code 70.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SplineFlags: i16 {
        const CLOSED = 0x1;
        const PERIODIC = 0x2;
        const RATIONAL = 0x4;
        const PLANAR = 0x8;
        const LINEAR = 0x10;
    }
}

/// A SPLINE entity: knots, optional weights, control points and fit
/// points.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    /// Common entity data
    pub common: EntityCommon,
    /// Spline flags (code 70)
    pub flags: SplineFlags,
    /// Degree of the curve (code 71)
    pub degree: i16,
    /// Knot values (code 40, repeated)
    pub knots: Vec<f64>,
    /// Weight values (code 41, repeated); all-1 weights are elided on
    /// write
    pub weights: Vec<f64>,
    /// Control points (codes 10/20/30, repeated)
    pub control_points: Vec<Vector3>,
    /// Fit points (codes 11/21/31, repeated)
    pub fit_points: Vec<Vector3>,
    /// Knot tolerance (code 42)
    pub knot_tolerance: Option<f64>,
    /// Control-point tolerance (code 43)
    pub control_point_tolerance: Option<f64>,
    /// Fit tolerance (code 44)
    pub fit_tolerance: Option<f64>,
    records: Vec<Record>,
}

impl Spline {
    /// Create an empty spline.
    pub fn new() -> Self {
        Spline {
            common: EntityCommon::new(),
            flags: SplineFlags::default(),
            degree: 0,
            knots: Vec::new(),
            weights: Vec::new(),
            control_points: Vec::new(),
            fit_points: Vec::new(),
            knot_tolerance: None,
            control_point_tolerance: None,
            fit_tolerance: None,
            records: Vec::new(),
        }
    }

    /// Whether every weight is 1 (and may be elided on write).
    fn weights_are_default(&self) -> bool {
        self.weights.is_empty() || self.weights.iter().all(|&w| w == 1.0)
    }
}

impl Default for Spline {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Spline {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn handle_record(&mut self, record: &Record) -> bool {
        match record.group_code {
            70 => {
                if let Some(v) = record.value.as_int() {
                    self.flags = SplineFlags::from_bits_retain(v as i16);
                    return true;
                }
                false
            }
            71 => {
                if let Some(v) = record.value.as_int() {
                    self.degree = v as i16;
                    return true;
                }
                false
            }
            // The declared knot/control/fit counts; the streams that
            // follow are authoritative.
            72 | 73 | 74 => record.value.as_int().is_some(),
            40 => {
                if let Some(v) = record.value.as_double() {
                    self.knots.push(v);
                    return true;
                }
                false
            }
            41 => {
                if let Some(v) = record.value.as_double() {
                    self.weights.push(v);
                    return true;
                }
                false
            }
            42 => {
                if let Some(v) = record.value.as_double() {
                    self.knot_tolerance = Some(v);
                    return true;
                }
                false
            }
            43 => {
                if let Some(v) = record.value.as_double() {
                    self.control_point_tolerance = Some(v);
                    return true;
                }
                false
            }
            44 => {
                if let Some(v) = record.value.as_double() {
                    self.fit_tolerance = Some(v);
                    return true;
                }
                false
            }
            10 => {
                if let Some(v) = record.value.as_double() {
                    self.control_points.push(Vector3::new(v, 0.0, 0.0));
                    return true;
                }
                false
            }
            20 => {
                if let (Some(v), Some(last)) =
                    (record.value.as_double(), self.control_points.last_mut())
                {
                    last.y = v;
                    return true;
                }
                false
            }
            30 => {
                if let (Some(v), Some(last)) =
                    (record.value.as_double(), self.control_points.last_mut())
                {
                    last.z = v;
                    return true;
                }
                false
            }
            11 => {
                if let Some(v) = record.value.as_double() {
                    self.fit_points.push(Vector3::new(v, 0.0, 0.0));
                    return true;
                }
                false
            }
            21 => {
                if let (Some(v), Some(last)) =
                    (record.value.as_double(), self.fit_points.last_mut())
                {
                    last.y = v;
                    return true;
                }
                false
            }
            31 => {
                if let (Some(v), Some(last)) =
                    (record.value.as_double(), self.fit_points.last_mut())
                {
                    last.z = v;
                    return true;
                }
                false
            }
            100 => {
                if record.value.as_str() == Some("AcDbSpline") {
                    return true;
                }
                self.common.handle_common_record(record)
            }
            _ => self.common.handle_common_record(record),
        }
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            70 => Some(Value::Int16(self.flags.bits())),
            71 => Some(Value::Int16(self.degree)),
            72 => Some(Value::Int16(self.knots.len() as i16)),
            73 => Some(Value::Int16(self.control_points.len() as i16)),
            74 => Some(Value::Int16(self.fit_points.len() as i16)),
            42 => self.knot_tolerance.map(Value::Double),
            43 => self.control_point_tolerance.map(Value::Double),
            44 => self.fit_tolerance.map(Value::Double),
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

impl Entity for Spline {
    fn entity_name(&self) -> &str {
        "SPLINE"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        output.write_string(100, "AcDbSpline")?;
        output.write_i16(70, self.flags.bits())?;
        output.write_i16(71, self.degree)?;
        output.write_i16(72, self.knots.len() as i16)?;
        output.write_i16(73, self.control_points.len() as i16)?;
        output.write_i16(74, self.fit_points.len() as i16)?;
        if let Some(tolerance) = self.knot_tolerance {
            output.write_f64(42, tolerance)?;
        }
        if let Some(tolerance) = self.control_point_tolerance {
            output.write_f64(43, tolerance)?;
        }
        if let Some(tolerance) = self.fit_tolerance {
            output.write_f64(44, tolerance)?;
        }
        for knot in &self.knots {
            output.write_f64(40, *knot)?;
        }
        if !self.weights_are_default() {
            for weight in &self.weights {
                output.write_f64(41, *weight)?;
            }
        }
        for point in &self.control_points {
            output.write_point(10, *point)?;
        }
        for point in &self.fit_points {
            output.write_point(11, *point)?;
        }
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        let mut count = self.common.count_records(&self.records);
        count += 6; // AcDbSpline marker + flags + degree + three counters
        count += usize::from(self.knot_tolerance.is_some());
        count += usize::from(self.control_point_tolerance.is_some());
        count += usize::from(self.fit_tolerance.is_some());
        count += self.knots.len();
        if !self.weights_are_default() {
            count += self.weights.len();
        }
        count += 3 * self.control_points.len();
        count += 3 * self.fit_points.len();
        count + self.count_retained()
    }

    fn extract_geometry(
        &self,
        _params: &TessellationParams,
        geometry: &mut Geometry,
    ) -> GeometryKind {
        // Entity-level extraction delivers the control frame (or the
        // fit points when there is no frame); curve evaluation is a
        // consumer concern.
        let source = if self.control_points.is_empty() {
            &self.fit_points
        } else {
            &self.control_points
        };
        if source.is_empty() {
            return GeometryKind::None;
        }
        geometry.vertices.extend_from_slice(source);
        GeometryKind::Lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_point(spline: &mut Spline, codes: (i32, i32, i32), p: (f64, f64, f64)) {
        spline.handle_record(&Record::new(codes.0, Value::Double(p.0)));
        spline.handle_record(&Record::new(codes.1, Value::Double(p.1)));
        spline.handle_record(&Record::new(codes.2, Value::Double(p.2)));
    }

    #[test]
    fn test_point_streams_accumulate() {
        let mut spline = Spline::new();
        feed_point(&mut spline, (10, 20, 30), (0.0, 0.0, 0.0));
        feed_point(&mut spline, (10, 20, 30), (1.0, 2.0, 3.0));
        feed_point(&mut spline, (11, 21, 31), (9.0, 9.0, 9.0));
        assert_eq!(spline.control_points.len(), 2);
        assert_eq!(spline.control_points[1], Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(spline.fit_points.len(), 1);
    }

    #[test]
    fn test_counter_records_derived() {
        let mut spline = Spline::new();
        spline.knots.extend([0.0, 0.0, 1.0, 1.0]);
        assert_eq!(spline.get_record(72), Some(Value::Int16(4)));
    }

    #[test]
    fn test_default_weights_elided() {
        let mut spline = Spline::new();
        spline.weights.extend([1.0, 1.0, 1.0]);
        let before = spline.count_records();
        spline.weights[1] = 2.0;
        assert_eq!(spline.count_records(), before + 3);
    }

    #[test]
    fn test_count_matches_write() {
        let mut spline = Spline::new();
        spline.flags = SplineFlags::PLANAR;
        spline.degree = 3;
        spline.knots.extend([0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        spline.control_points.extend([
            Vector3::ZERO,
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
        ]);
        spline.fit_tolerance = Some(1e-9);
        let mut buf = Vec::new();
        {
            let mut out = Output::new(&mut buf);
            spline.write(&mut out).unwrap();
            assert_eq!(out.written_records(), spline.count_records());
        }
    }
}
