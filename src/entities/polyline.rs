//! Polyline and vertex entities
//!
//! A POLYLINE whose "entities follow" flag (code 66) is set continues
//! into VERTEX entities terminated by SEQEND. Vertices are partitioned
//! at parse time into three lists: spline-frame control vertices,
//! polyface-mesh index vertices, and ordinary coordinate vertices.

use super::{
    Entity, EntityCallback, EntityCommon, Extrusion, Geometry, GeometryKind, TessellationParams,
    UnknownEntity,
};
use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::state::State;
use crate::types::Vector3;
use bitflags::bitflags;

bitflags! {
    /// POLYLINE flags, group code 70.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PolylineFlags: i16 {
        /// Closed polyline (or closed in M for meshes)
        const CLOSED = 0x1;
        const CURVE_FIT = 0x2;
        const SPLINE_FIT = 0x4;
        const POLYLINE_3D = 0x8;
        const POLYGON_MESH = 0x10;
        /// Closed in N for meshes
        const CLOSED_N = 0x20;
        const POLYFACE_MESH = 0x40;
        const CONTINUOUS_PATTERN = 0x80;
    }
}

bitflags! {
    /// VERTEX flags, group code 70.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VertexFlags: i16 {
        const EXTRA_VERTEX = 0x1;
        const CURVE_FIT = 0x2;
        const SPLINE_VERTEX = 0x8;
        /// Spline-frame control point
        const SPLINE_CONTROL = 0x10;
        const POLYLINE_3D = 0x20;
        const POLYGON_MESH = 0x40;
        /// Polyface-mesh vertex (index vertex when POLYGON_MESH is
        /// clear)
        const POLYFACE_FACE = 0x80;
    }
}

/// The shape class of a polyline, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolylineType {
    Polyline2D,
    Polyline3D,
    PolygonMesh,
    PolyfaceMesh,
}

/// A VERTEX entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Common entity data
    pub common: EntityCommon,
    /// Location (codes 10/20/30)
    pub location: Vector3,
    /// Vertex flags (code 70)
    pub flags: VertexFlags,
    /// Starting width (code 40)
    pub start_width: f64,
    /// Ending width (code 41)
    pub end_width: f64,
    /// Bulge (code 42)
    pub bulge: f64,
    /// Curve fit tangent direction (code 50)
    pub tangent: f64,
    /// Polyface-mesh face definition (codes 71..74); 0 = unused slot,
    /// negative = hidden edge
    pub indices: [i16; 4],
    records: Vec<Record>,
}

impl Vertex {
    /// Create a vertex at the origin.
    pub fn new() -> Self {
        Vertex {
            common: EntityCommon::new(),
            location: Vector3::ZERO,
            flags: VertexFlags::default(),
            start_width: 0.0,
            end_width: 0.0,
            bulge: 0.0,
            tangent: 0.0,
            indices: [0; 4],
            records: Vec::new(),
        }
    }

    /// Create a coordinate vertex at a location.
    pub fn at(location: Vector3) -> Self {
        Vertex {
            location,
            ..Self::new()
        }
    }

    /// Whether any face-definition index is present.
    pub fn has_indices(&self) -> bool {
        self.indices.iter().any(|&i| i != 0)
    }

    /// Number of face-definition indices present.
    pub fn index_count(&self) -> usize {
        self.indices.iter().filter(|&&i| i != 0).count()
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Vertex {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn handle_record(&mut self, record: &Record) -> bool {
        match record.group_code {
            10 | 20 | 30 => {
                if let Some(v) = record.value.as_double() {
                    match record.group_code {
                        10 => self.location.x = v,
                        20 => self.location.y = v,
                        _ => self.location.z = v,
                    }
                    return true;
                }
                false
            }
            40 => {
                if let Some(v) = record.value.as_double() {
                    self.start_width = v;
                    return true;
                }
                false
            }
            41 => {
                if let Some(v) = record.value.as_double() {
                    self.end_width = v;
                    return true;
                }
                false
            }
            42 => {
                if let Some(v) = record.value.as_double() {
                    self.bulge = v;
                    return true;
                }
                false
            }
            50 => {
                if let Some(v) = record.value.as_double() {
                    self.tangent = v;
                    return true;
                }
                false
            }
            70 => {
                if let Some(v) = record.value.as_int() {
                    self.flags = VertexFlags::from_bits_retain(v as i16);
                    return true;
                }
                false
            }
            71..=74 => {
                if let Some(v) = record.value.as_int() {
                    self.indices[(record.group_code - 71) as usize] = v as i16;
                    return true;
                }
                false
            }
            _ => self.common.handle_common_record(record),
        }
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            10 => Some(Value::Double(self.location.x)),
            20 => Some(Value::Double(self.location.y)),
            30 => Some(Value::Double(self.location.z)),
            40 => Some(Value::Double(self.start_width)),
            41 => Some(Value::Double(self.end_width)),
            42 => Some(Value::Double(self.bulge)),
            50 => Some(Value::Double(self.tangent)),
            70 => Some(Value::Int16(self.flags.bits())),
            71..=74 => Some(Value::Int16(self.indices[(group_code - 71) as usize])),
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

impl Entity for Vertex {
    fn entity_name(&self) -> &str {
        "VERTEX"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        output.write_point(10, self.location)?;
        if self.start_width != 0.0 {
            output.write_f64(40, self.start_width)?;
        }
        if self.end_width != 0.0 {
            output.write_f64(41, self.end_width)?;
        }
        if self.bulge != 0.0 {
            output.write_f64(42, self.bulge)?;
        }
        if self.tangent != 0.0 {
            output.write_f64(50, self.tangent)?;
        }
        if !self.flags.is_empty() {
            output.write_i16(70, self.flags.bits())?;
        }
        for (i, index) in self.indices.iter().enumerate() {
            if *index != 0 {
                output.write_i16(71 + i as i32, *index)?;
            }
        }
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        let mut count = self.common.count_records(&self.records) + 3;
        count += usize::from(self.start_width != 0.0);
        count += usize::from(self.end_width != 0.0);
        count += usize::from(self.bulge != 0.0);
        count += usize::from(self.tangent != 0.0);
        count += usize::from(!self.flags.is_empty());
        count += self.index_count();
        count + self.count_retained()
    }
}

/// A POLYLINE entity with its vertex lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Common entity data
    pub common: EntityCommon,
    /// Polyline flags (code 70)
    pub flags: PolylineFlags,
    /// Elevation point (codes 10/20/30; only z is meaningful)
    pub elevation: Vector3,
    /// Default starting width (code 40)
    pub default_start_width: f64,
    /// Default ending width (code 41)
    pub default_end_width: f64,
    /// Mesh M vertex count (code 71)
    pub mesh_m: i16,
    /// Mesh N vertex count (code 72)
    pub mesh_n: i16,
    /// Smooth surface M density (code 73)
    pub smooth_m: i16,
    /// Smooth surface N density (code 74)
    pub smooth_n: i16,
    /// Smooth surface type (code 75)
    pub surface_type: i16,
    /// Thickness and extrusion direction
    pub extrusion: Extrusion,
    /// Geometric vertices
    pub coord_vertices: Vec<Vertex>,
    /// Polyface-mesh face-definition vertices
    pub index_vertices: Vec<Vertex>,
    /// Spline-frame control vertices
    pub frame_vertices: Vec<Vertex>,
    /// The SEQEND marker, preserved so its attributes round-trip
    pub seqend: Option<UnknownEntity>,
    entities_follow: bool,
    records: Vec<Record>,
}

impl Polyline {
    /// Create an empty polyline.
    pub fn new() -> Self {
        Polyline {
            common: EntityCommon::new(),
            flags: PolylineFlags::default(),
            elevation: Vector3::ZERO,
            default_start_width: 0.0,
            default_end_width: 0.0,
            mesh_m: 0,
            mesh_n: 0,
            smooth_m: 0,
            smooth_n: 0,
            surface_type: 0,
            extrusion: Extrusion::new(),
            coord_vertices: Vec::new(),
            index_vertices: Vec::new(),
            frame_vertices: Vec::new(),
            seqend: None,
            entities_follow: false,
            records: Vec::new(),
        }
    }

    /// The shape class derived from the flags.
    pub fn get_type(&self) -> PolylineType {
        if self.flags.contains(PolylineFlags::POLYFACE_MESH) {
            PolylineType::PolyfaceMesh
        } else if self.flags.contains(PolylineFlags::POLYGON_MESH) {
            PolylineType::PolygonMesh
        } else if self.flags.contains(PolylineFlags::POLYLINE_3D) {
            PolylineType::Polyline3D
        } else {
            PolylineType::Polyline2D
        }
    }

    /// Total vertex count across the three lists.
    pub fn vertex_count(&self) -> usize {
        self.coord_vertices.len() + self.index_vertices.len() + self.frame_vertices.len()
    }

    /// Append a vertex, routing it to the proper list.
    pub fn add_vertex(&mut self, vertex: Vertex) {
        Self::partition(vertex, &mut self.coord_vertices, &mut self.index_vertices, &mut self.frame_vertices);
    }

    /// Iterate over all vertices, mutably, across the three lists.
    pub(crate) fn vertices_mut(&mut self) -> impl Iterator<Item = &mut Vertex> {
        self.coord_vertices
            .iter_mut()
            .chain(self.index_vertices.iter_mut())
            .chain(self.frame_vertices.iter_mut())
    }

    /// Bucket a vertex: flag 16 marks a spline-frame vertex, face
    /// indices mark an index vertex, anything else is a coordinate
    /// vertex.
    fn partition(
        vertex: Vertex,
        coord: &mut Vec<Vertex>,
        index: &mut Vec<Vertex>,
        frame: &mut Vec<Vertex>,
    ) {
        if vertex.flags.contains(VertexFlags::SPLINE_CONTROL) {
            frame.push(vertex);
        } else if vertex.has_indices() {
            index.push(vertex);
        } else {
            coord.push(vertex);
        }
    }

    /// Read the record set, then the vertex list when the
    /// entities-follow flag was present.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        self.read_records(input)?;
        if !self.entities_follow {
            return Ok(());
        }
        loop {
            let group_code = input.read_group_code()?;
            if group_code != 0 {
                return Err(DxfError::Parse(format!(
                    "expected VERTEX or SEQEND, got group code {} at {}",
                    group_code,
                    input.position_string()
                )));
            }
            let name = input.read_string()?;
            match name.as_str() {
                "SEQEND" => {
                    let mut seqend = UnknownEntity::new("SEQEND");
                    seqend.read_records(input)?;
                    self.seqend = Some(seqend);
                    return Ok(());
                }
                "VERTEX" => {
                    let mut vertex = Vertex::new();
                    vertex.read_records(input)?;
                    self.add_vertex(vertex);
                }
                other => {
                    return Err(DxfError::Parse(format!(
                        "unexpected entity {} in vertex list at {}",
                        other,
                        input.position_string()
                    )));
                }
            }
        }
    }

    /// Deliver the polyline, then its vertices when the state requests
    /// them.
    pub fn traverse(&self, state: &State, callback: &mut EntityCallback<'_>) -> bool {
        if !callback(state, self) {
            return false;
        }
        if state.traverse_polyline_vertices() {
            for vertex in self
                .coord_vertices
                .iter()
                .chain(self.index_vertices.iter())
                .chain(self.frame_vertices.iter())
            {
                if !callback(state, vertex) {
                    return false;
                }
            }
        }
        true
    }

    fn extract_polyline_path(&self, geometry: &mut Geometry) -> GeometryKind {
        if self.coord_vertices.is_empty() {
            return GeometryKind::None;
        }
        for vertex in &self.coord_vertices {
            geometry.vertices.push(vertex.location);
        }
        if self.flags.contains(PolylineFlags::CLOSED) {
            geometry.vertices.push(geometry.vertices[0]);
        }
        GeometryKind::Lines
    }

    fn extract_polyface_mesh(&self, geometry: &mut Geometry) -> GeometryKind {
        if self.coord_vertices.is_empty() || self.index_vertices.is_empty() {
            return GeometryKind::None;
        }
        for vertex in &self.coord_vertices {
            geometry.vertices.push(vertex.location);
        }
        for face in &self.index_vertices {
            for &index in face.indices.iter() {
                if index != 0 {
                    // Negative indices flag hidden edges; the vertex
                    // reference is the absolute value, 1-based.
                    geometry.indices.push(i32::from(index.abs()) - 1);
                }
            }
            geometry.indices.push(-1);
        }
        GeometryKind::Polygons
    }

    fn extract_polygon_mesh(&self, geometry: &mut Geometry) -> GeometryKind {
        let count = self.coord_vertices.len();
        if count == 0 {
            return GeometryKind::None;
        }
        let m = self.mesh_m.max(0) as usize;
        let n = self.mesh_n.max(0) as usize;
        let m2 = self.smooth_m.max(0) as usize;
        let n2 = self.smooth_n.max(0) as usize;

        // The coordinate list may carry the control grid, the smoothed
        // grid, or both back to back; quads are generated over
        // whichever grid the counters account for.
        let (grid_m, grid_n, offset) = if m2 * n2 > 0 && m * n + m2 * n2 == count {
            (m2, n2, m * n)
        } else if m * n == count {
            (m, n, 0)
        } else if m2 * n2 == count {
            (m2, n2, 0)
        } else {
            return GeometryKind::None;
        };
        if grid_m < 2 || grid_n < 2 {
            return GeometryKind::None;
        }

        for vertex in &self.coord_vertices {
            geometry.vertices.push(vertex.location);
        }

        let rows = if self.flags.contains(PolylineFlags::CLOSED) {
            grid_m
        } else {
            grid_m - 1
        };
        let cols = if self.flags.contains(PolylineFlags::CLOSED_N) {
            grid_n
        } else {
            grid_n - 1
        };
        for i in 0..rows {
            for j in 0..cols {
                let i2 = (i + 1) % grid_m;
                let j2 = (j + 1) % grid_n;
                geometry.indices.push((offset + i * grid_n + j) as i32);
                geometry.indices.push((offset + i * grid_n + j2) as i32);
                geometry.indices.push((offset + i2 * grid_n + j2) as i32);
                geometry.indices.push((offset + i2 * grid_n + j) as i32);
                geometry.indices.push(-1);
            }
        }
        GeometryKind::Polygons
    }
}

impl Default for Polyline {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Polyline {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn handle_record(&mut self, record: &Record) -> bool {
        match record.group_code {
            66 => {
                if let Some(v) = record.value.as_int() {
                    self.entities_follow = v == 1;
                    return true;
                }
                false
            }
            70 => {
                if let Some(v) = record.value.as_int() {
                    self.flags = PolylineFlags::from_bits_retain(v as i16);
                    return true;
                }
                false
            }
            10 | 20 | 30 => {
                if let Some(v) = record.value.as_double() {
                    match record.group_code {
                        10 => self.elevation.x = v,
                        20 => self.elevation.y = v,
                        _ => self.elevation.z = v,
                    }
                    return true;
                }
                false
            }
            40 => {
                if let Some(v) = record.value.as_double() {
                    self.default_start_width = v;
                    return true;
                }
                false
            }
            41 => {
                if let Some(v) = record.value.as_double() {
                    self.default_end_width = v;
                    return true;
                }
                false
            }
            71 => {
                if let Some(v) = record.value.as_int() {
                    self.mesh_m = v as i16;
                    return true;
                }
                false
            }
            72 => {
                if let Some(v) = record.value.as_int() {
                    self.mesh_n = v as i16;
                    return true;
                }
                false
            }
            73 => {
                if let Some(v) = record.value.as_int() {
                    self.smooth_m = v as i16;
                    return true;
                }
                false
            }
            74 => {
                if let Some(v) = record.value.as_int() {
                    self.smooth_n = v as i16;
                    return true;
                }
                false
            }
            75 => {
                if let Some(v) = record.value.as_int() {
                    self.surface_type = v as i16;
                    return true;
                }
                false
            }
            _ => {
                self.extrusion.handle_record(record) || self.common.handle_common_record(record)
            }
        }
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            66 => Some(Value::Int16(i16::from(self.entities_follow))),
            70 => Some(Value::Int16(self.flags.bits())),
            10 => Some(Value::Double(self.elevation.x)),
            20 => Some(Value::Double(self.elevation.y)),
            30 => Some(Value::Double(self.elevation.z)),
            40 => Some(Value::Double(self.default_start_width)),
            41 => Some(Value::Double(self.default_end_width)),
            71 => Some(Value::Int16(self.mesh_m)),
            72 => Some(Value::Int16(self.mesh_n)),
            73 => Some(Value::Int16(self.smooth_m)),
            74 => Some(Value::Int16(self.smooth_n)),
            75 => Some(Value::Int16(self.surface_type)),
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

impl Entity for Polyline {
    fn entity_name(&self) -> &str {
        "POLYLINE"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        let has_vertices = self.vertex_count() > 0;
        if has_vertices {
            output.write_i16(66, 1)?;
        }
        output.write_point(10, self.elevation)?;
        output.write_i16(70, self.flags.bits())?;
        if self.default_start_width != 0.0 {
            output.write_f64(40, self.default_start_width)?;
        }
        if self.default_end_width != 0.0 {
            output.write_f64(41, self.default_end_width)?;
        }
        if self.mesh_m != 0 {
            output.write_i16(71, self.mesh_m)?;
        }
        if self.mesh_n != 0 {
            output.write_i16(72, self.mesh_n)?;
        }
        if self.smooth_m != 0 {
            output.write_i16(73, self.smooth_m)?;
        }
        if self.smooth_n != 0 {
            output.write_i16(74, self.smooth_n)?;
        }
        if self.surface_type != 0 {
            output.write_i16(75, self.surface_type)?;
        }
        self.extrusion.write(output)?;
        self.write_retained(output)?;
        if has_vertices {
            for vertex in self
                .coord_vertices
                .iter()
                .chain(self.index_vertices.iter())
                .chain(self.frame_vertices.iter())
            {
                vertex.write(output)?;
            }
            match &self.seqend {
                Some(seqend) => seqend.write(output)?,
                None => output.write_string(0, "SEQEND")?,
            }
        }
        Ok(())
    }

    fn count_records(&self) -> usize {
        let mut count = self.common.count_records(&self.records);
        let has_vertices = self.vertex_count() > 0;
        count += usize::from(has_vertices); // entities-follow flag
        count += 4; // elevation + flags
        count += usize::from(self.default_start_width != 0.0);
        count += usize::from(self.default_end_width != 0.0);
        count += usize::from(self.mesh_m != 0);
        count += usize::from(self.mesh_n != 0);
        count += usize::from(self.smooth_m != 0);
        count += usize::from(self.smooth_n != 0);
        count += usize::from(self.surface_type != 0);
        count += self.extrusion.count_records();
        count += self.count_retained();
        if has_vertices {
            count += self
                .coord_vertices
                .iter()
                .chain(self.index_vertices.iter())
                .chain(self.frame_vertices.iter())
                .map(|v| v.count_records())
                .sum::<usize>();
            count += match &self.seqend {
                Some(seqend) => seqend.count_records(),
                None => 1,
            };
        }
        count
    }

    fn extract_geometry(
        &self,
        _params: &TessellationParams,
        geometry: &mut Geometry,
    ) -> GeometryKind {
        geometry.extrusion = self.extrusion.direction;
        geometry.thickness = self.extrusion.thickness;
        match self.get_type() {
            PolylineType::Polyline2D | PolylineType::Polyline3D => {
                self.extract_polyline_path(geometry)
            }
            PolylineType::PolyfaceMesh => self.extract_polyface_mesh(geometry),
            PolylineType::PolygonMesh => self.extract_polygon_mesh(geometry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord_vertex(x: f64, y: f64) -> Vertex {
        Vertex::at(Vector3::new(x, y, 0.0))
    }

    #[test]
    fn test_type_classification() {
        let mut poly = Polyline::new();
        assert_eq!(poly.get_type(), PolylineType::Polyline2D);
        poly.flags = PolylineFlags::POLYLINE_3D;
        assert_eq!(poly.get_type(), PolylineType::Polyline3D);
        poly.flags = PolylineFlags::POLYGON_MESH;
        assert_eq!(poly.get_type(), PolylineType::PolygonMesh);
        poly.flags = PolylineFlags::POLYFACE_MESH | PolylineFlags::POLYGON_MESH;
        assert_eq!(poly.get_type(), PolylineType::PolyfaceMesh);
    }

    #[test]
    fn test_vertex_partitioning() {
        let mut poly = Polyline::new();

        let mut frame = Vertex::new();
        frame.flags = VertexFlags::SPLINE_CONTROL;
        poly.add_vertex(frame);

        let mut index = Vertex::new();
        index.flags = VertexFlags::POLYFACE_FACE;
        index.indices = [1, 2, 3, 0];
        poly.add_vertex(index);

        let mut coord = Vertex::new();
        coord.flags = VertexFlags::POLYFACE_FACE | VertexFlags::POLYGON_MESH;
        poly.add_vertex(coord);

        assert_eq!(poly.frame_vertices.len(), 1);
        assert_eq!(poly.index_vertices.len(), 1);
        assert_eq!(poly.coord_vertices.len(), 1);
    }

    #[test]
    fn test_closed_polyline_path() {
        let mut poly = Polyline::new();
        poly.flags = PolylineFlags::CLOSED;
        poly.add_vertex(coord_vertex(0.0, 0.0));
        poly.add_vertex(coord_vertex(1.0, 0.0));
        poly.add_vertex(coord_vertex(1.0, 1.0));
        let mut geometry = Geometry::new();
        let kind = poly.extract_geometry(&TessellationParams::default(), &mut geometry);
        assert_eq!(kind, GeometryKind::Lines);
        assert_eq!(geometry.vertices.len(), 4);
        assert_eq!(geometry.vertices[3], geometry.vertices[0]);
    }

    #[test]
    fn test_polyface_mesh_indices() {
        let mut poly = Polyline::new();
        poly.flags = PolylineFlags::POLYFACE_MESH;
        poly.add_vertex(coord_vertex(0.0, 0.0));
        poly.add_vertex(coord_vertex(1.0, 0.0));
        poly.add_vertex(coord_vertex(1.0, 1.0));
        poly.add_vertex(coord_vertex(0.0, 1.0));

        let mut face = Vertex::new();
        face.flags = VertexFlags::POLYFACE_FACE;
        face.indices = [1, 2, 3, 4];
        poly.add_vertex(face);

        let mut geometry = Geometry::new();
        let kind = poly.extract_geometry(&TessellationParams::default(), &mut geometry);
        assert_eq!(kind, GeometryKind::Polygons);
        assert_eq!(geometry.vertices.len(), 4);
        assert_eq!(geometry.indices, vec![0, 1, 2, 3, -1]);
    }

    #[test]
    fn test_polyface_hidden_edge_uses_absolute_value() {
        let mut poly = Polyline::new();
        poly.flags = PolylineFlags::POLYFACE_MESH;
        for i in 0..3 {
            poly.add_vertex(coord_vertex(i as f64, 0.0));
        }
        let mut face = Vertex::new();
        face.flags = VertexFlags::POLYFACE_FACE;
        face.indices = [1, -2, 3, 0];
        poly.add_vertex(face);

        let mut geometry = Geometry::new();
        poly.extract_geometry(&TessellationParams::default(), &mut geometry);
        assert_eq!(geometry.indices, vec![0, 1, 2, -1]);
    }

    #[test]
    fn test_polygon_mesh_grid() {
        let mut poly = Polyline::new();
        poly.flags = PolylineFlags::POLYGON_MESH;
        poly.mesh_m = 2;
        poly.mesh_n = 2;
        for i in 0..4 {
            poly.add_vertex(coord_vertex(i as f64, i as f64));
        }
        let mut geometry = Geometry::new();
        let kind = poly.extract_geometry(&TessellationParams::default(), &mut geometry);
        assert_eq!(kind, GeometryKind::Polygons);
        // One quad, terminated by -1
        assert_eq!(geometry.indices, vec![0, 1, 3, 2, -1]);
    }

    #[test]
    fn test_polygon_mesh_count_mismatch_rejected() {
        let mut poly = Polyline::new();
        poly.flags = PolylineFlags::POLYGON_MESH;
        poly.mesh_m = 3;
        poly.mesh_n = 3;
        for i in 0..4 {
            poly.add_vertex(coord_vertex(i as f64, 0.0));
        }
        let mut geometry = Geometry::new();
        assert_eq!(
            poly.extract_geometry(&TessellationParams::default(), &mut geometry),
            GeometryKind::None
        );
    }

    #[test]
    fn test_count_matches_write() {
        let mut poly = Polyline::new();
        poly.flags = PolylineFlags::CLOSED;
        poly.add_vertex(coord_vertex(0.0, 0.0));
        poly.add_vertex(coord_vertex(1.0, 0.0));
        let mut buf = Vec::new();
        {
            let mut out = Output::new(&mut buf);
            poly.write(&mut out).unwrap();
            assert_eq!(out.written_records(), poly.count_records());
        }
    }
}
