//! Lightweight polyline entity

use super::{Entity, EntityCommon, Extrusion, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::{Vector2, Vector3};

/// Closed-polyline bit of the LWPOLYLINE flags (code 70).
pub const LWPOLYLINE_CLOSED: i16 = 1;

/// A vertex of a lightweight polyline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LwVertex {
    /// Location of the vertex (codes 10/20)
    pub location: Vector2,
    /// Starting width at this vertex (code 40)
    pub start_width: f64,
    /// Ending width at this vertex (code 41)
    pub end_width: f64,
    /// Bulge (code 42): 0 = straight segment
    pub bulge: f64,
}

impl LwVertex {
    /// Create a vertex at a location.
    pub fn new(location: Vector2) -> Self {
        LwVertex {
            location,
            ..Default::default()
        }
    }
}

// Per-vertex field bits used to detect the start of a new point while
// reading the compact encoding.
const SEEN_X: u8 = 0x01;
const SEEN_Y: u8 = 0x02;
const SEEN_START_WIDTH: u8 = 0x04;
const SEEN_END_WIDTH: u8 = 0x08;
const SEEN_BULGE: u8 = 0x10;

/// A lightweight (LWPOLYLINE) entity: vertices encoded as repeated
/// per-vertex field groups.
#[derive(Debug, Clone, PartialEq)]
pub struct LwPolyline {
    /// Common entity data
    pub common: EntityCommon,
    /// The vertices in order
    pub vertices: Vec<LwVertex>,
    /// Polyline flags (code 70); bit 1 closes the loop
    pub flags: i16,
    /// Constant width (code 43)
    pub constant_width: f64,
    /// Elevation (code 38)
    pub elevation: f64,
    /// Thickness and extrusion direction
    pub extrusion: Extrusion,
    /// Vertex count declared on input (code 90); the write side uses
    /// the actual vertex count
    declared_vertices: i32,
    seen_fields: u8,
    records: Vec<Record>,
}

impl LwPolyline {
    /// Create an empty lightweight polyline.
    pub fn new() -> Self {
        LwPolyline {
            common: EntityCommon::new(),
            vertices: Vec::new(),
            flags: 0,
            constant_width: 0.0,
            elevation: 0.0,
            extrusion: Extrusion::new(),
            declared_vertices: 0,
            seen_fields: 0,
            records: Vec::new(),
        }
    }

    /// Whether the closed bit is set.
    pub fn is_closed(&self) -> bool {
        self.flags & LWPOLYLINE_CLOSED != 0
    }

    /// Append a vertex.
    pub fn add_vertex(&mut self, vertex: LwVertex) {
        self.vertices.push(vertex);
    }

    /// Route a vertex-scoped field. Seeing a field that the current
    /// point already carries starts a new point.
    fn vertex_field(&mut self, seen_bit: u8, apply: impl FnOnce(&mut LwVertex)) {
        if self.vertices.is_empty() || self.seen_fields & seen_bit != 0 {
            self.vertices.push(LwVertex::default());
            self.seen_fields = 0;
        }
        self.seen_fields |= seen_bit;
        apply(self.vertices.last_mut().expect("vertex just ensured"));
    }
}

impl Default for LwPolyline {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for LwPolyline {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn handle_record(&mut self, record: &Record) -> bool {
        match record.group_code {
            90 => {
                if let Some(v) = record.value.as_int() {
                    self.declared_vertices = v as i32;
                    self.vertices.reserve(v.max(0) as usize);
                    return true;
                }
                false
            }
            70 => {
                if let Some(v) = record.value.as_int() {
                    self.flags = v as i16;
                    return true;
                }
                false
            }
            38 => {
                if let Some(v) = record.value.as_double() {
                    self.elevation = v;
                    return true;
                }
                false
            }
            43 => {
                if let Some(v) = record.value.as_double() {
                    self.constant_width = v;
                    return true;
                }
                false
            }
            10 => {
                if let Some(v) = record.value.as_double() {
                    self.vertex_field(SEEN_X, |vertex| vertex.location.x = v);
                    return true;
                }
                false
            }
            20 => {
                if let Some(v) = record.value.as_double() {
                    self.vertex_field(SEEN_Y, |vertex| vertex.location.y = v);
                    return true;
                }
                false
            }
            40 => {
                if let Some(v) = record.value.as_double() {
                    self.vertex_field(SEEN_START_WIDTH, |vertex| vertex.start_width = v);
                    return true;
                }
                false
            }
            41 => {
                if let Some(v) = record.value.as_double() {
                    self.vertex_field(SEEN_END_WIDTH, |vertex| vertex.end_width = v);
                    return true;
                }
                false
            }
            42 => {
                if let Some(v) = record.value.as_double() {
                    self.vertex_field(SEEN_BULGE, |vertex| vertex.bulge = v);
                    return true;
                }
                false
            }
            100 => {
                if record.value.as_str() == Some("AcDbPolyline") {
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
            90 => Some(Value::Int32(self.vertices.len() as i32)),
            70 => Some(Value::Int16(self.flags)),
            38 => Some(Value::Double(self.elevation)),
            43 => Some(Value::Double(self.constant_width)),
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

impl Entity for LwPolyline {
    fn entity_name(&self) -> &str {
        "LWPOLYLINE"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        output.write_string(100, "AcDbPolyline")?;
        output.write_i32(90, self.vertices.len() as i32)?;
        output.write_i16(70, self.flags)?;
        if self.constant_width != 0.0 {
            output.write_f64(43, self.constant_width)?;
        }
        if self.elevation != 0.0 {
            output.write_f64(38, self.elevation)?;
        }
        for vertex in &self.vertices {
            output.write_f64(10, vertex.location.x)?;
            output.write_f64(20, vertex.location.y)?;
            if vertex.start_width != 0.0 || vertex.end_width != 0.0 {
                output.write_f64(40, vertex.start_width)?;
                output.write_f64(41, vertex.end_width)?;
            }
            if vertex.bulge != 0.0 {
                output.write_f64(42, vertex.bulge)?;
            }
        }
        self.extrusion.write(output)?;
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        let mut count = self.common.count_records(&self.records);
        count += 3; // AcDbPolyline marker + vertex count + flags
        if self.constant_width != 0.0 {
            count += 1;
        }
        if self.elevation != 0.0 {
            count += 1;
        }
        for vertex in &self.vertices {
            count += 2;
            if vertex.start_width != 0.0 || vertex.end_width != 0.0 {
                count += 2;
            }
            if vertex.bulge != 0.0 {
                count += 1;
            }
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
        if self.vertices.is_empty() {
            return GeometryKind::None;
        }
        for vertex in &self.vertices {
            geometry.vertices.push(Vector3::new(
                vertex.location.x,
                vertex.location.y,
                self.elevation,
            ));
        }
        if self.is_closed() {
            geometry.vertices.push(geometry.vertices[0]);
        }
        GeometryKind::Lines
    }
}
