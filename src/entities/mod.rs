//! DXF entity types
//!
//! Entities share a common header (layer reference, color, handle,
//! retained records) and differ in their typed fields. Storage is the
//! [`EntityType`] enum; behavior is the object-safe [`Entity`] trait,
//! which traversal callbacks receive so BLOCK and VERTEX objects (owned
//! by their composites rather than the enum) can be delivered through
//! the same channel.

use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use crate::layer::{Layer, LayerRef};
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::state::State;
use crate::types::Vector3;
use bitflags::bitflags;

pub mod arc;
pub mod block;
pub mod circle;
pub mod ellipse;
pub mod face3d;
pub mod insert;
pub mod line;
pub mod lwpolyline;
pub mod mtext;
pub mod point;
pub mod polyline;
pub mod solid;
pub mod spline;
pub mod text;
pub mod trace;
pub mod unknown_entity;

pub use arc::Arc;
pub use block::{Block, BlockMap, BlockRef};
pub use circle::Circle;
pub use ellipse::Ellipse;
pub use face3d::Face3D;
pub use insert::Insert;
pub use line::Line;
pub use lwpolyline::{LwPolyline, LwVertex};
pub use mtext::MText;
pub use point::Point;
pub use polyline::{Polyline, PolylineFlags, PolylineType, Vertex, VertexFlags};
pub use solid::Solid;
pub use spline::Spline;
pub use text::Text;
pub use trace::Trace;
pub use unknown_entity::UnknownEntity;

bitflags! {
    /// Which optional common fields were present on input, so the
    /// write side reproduces exactly what was read.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CommonFlags: u16 {
        const HANDLE = 0x01;
        const LINETYPE = 0x02;
        const SUBCLASS = 0x04;
        const PAPERSPACE = 0x08;
        const REACTORS = 0x10;
        const XDICTIONARY = 0x20;
        const COLOR = 0x40;
    }
}

/// Color number constant: inherit from the layer.
pub const COLOR_BYLAYER: i16 = 256;

/// Color number constant: inherit from the block.
pub const COLOR_BYBLOCK: i16 = 0;

/// Common entity data shared by all entities.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCommon {
    layer: LayerRef,
    pending_layer_name: Option<String>,
    color_number: i16,
    handle: Option<String>,
    linetype: Option<String>,
    subclass: Option<String>,
    paperspace: i16,
    reactors_owner: Option<String>,
    xdictionary_owner: Option<String>,
    flags: CommonFlags,
    /// Logical removal: writers and traversal skip deleted entities
    /// without invalidating iterators.
    pub deleted: bool,
}

impl EntityCommon {
    /// Create common data with defaults: sentinel layer, BYLAYER color.
    pub fn new() -> Self {
        EntityCommon {
            layer: Layer::default_layer(),
            pending_layer_name: None,
            color_number: COLOR_BYLAYER,
            handle: None,
            linetype: None,
            subclass: None,
            paperspace: 0,
            reactors_owner: None,
            xdictionary_owner: None,
            flags: CommonFlags::default(),
            deleted: false,
        }
    }

    /// The layer this entity lives on. Never null; defaults to the
    /// sentinel layer until the model resolves the name.
    pub fn layer(&self) -> &LayerRef {
        &self.layer
    }

    /// The layer name as it will be written (a pending unresolved name
    /// wins over the resolved reference).
    pub fn layer_name(&self) -> &str {
        self.pending_layer_name
            .as_deref()
            .unwrap_or_else(|| self.layer.name())
    }

    /// Point the entity at a registered layer.
    pub fn set_layer(&mut self, layer: LayerRef) {
        self.pending_layer_name = None;
        self.layer = layer;
    }

    /// The color number; 256 = BYLAYER, 0 = BYBLOCK, negative = layer
    /// off.
    pub fn color_number(&self) -> i16 {
        self.color_number
    }

    /// Set the color number (marks the color as explicitly present).
    pub fn set_color_number(&mut self, color_number: i16) {
        self.color_number = color_number;
        self.flags |= CommonFlags::COLOR;
    }

    /// The color number if it was explicitly present on input.
    pub fn explicit_color(&self) -> Option<i16> {
        self.flags.contains(CommonFlags::COLOR).then_some(self.color_number)
    }

    /// The stored handle (hex string), if any.
    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    /// Set the handle (hex string).
    pub fn set_handle(&mut self, handle: impl Into<String>) {
        self.handle = Some(handle.into());
        self.flags |= CommonFlags::HANDLE;
    }

    /// The linetype name, if present.
    pub fn linetype(&self) -> Option<&str> {
        self.linetype.as_deref()
    }

    /// Paperspace flag (group code 67).
    pub fn paperspace(&self) -> i16 {
        self.paperspace
    }

    pub(crate) fn take_pending_layer_name(&mut self) -> Option<String> {
        self.pending_layer_name.take()
    }

    pub(crate) fn set_layer_ref(&mut self, layer: LayerRef) {
        self.layer = layer;
    }

    /// Offer a record; consumes the common entity codes.
    pub fn handle_common_record(&mut self, record: &Record) -> bool {
        match record.group_code {
            8 => {
                if let Some(s) = record.value.as_str() {
                    self.pending_layer_name = Some(s.to_string());
                    return true;
                }
                false
            }
            62 => {
                if let Some(v) = record.value.as_int() {
                    self.color_number = v as i16;
                    self.flags |= CommonFlags::COLOR;
                    return true;
                }
                false
            }
            67 => {
                if let Some(v) = record.value.as_int() {
                    self.paperspace = v as i16;
                    self.flags |= CommonFlags::PAPERSPACE;
                    return true;
                }
                false
            }
            5 => {
                if let Some(s) = record.value.as_str() {
                    self.handle = Some(s.to_string());
                    self.flags |= CommonFlags::HANDLE;
                    return true;
                }
                false
            }
            6 => {
                if let Some(s) = record.value.as_str() {
                    self.linetype = Some(s.to_string());
                    self.flags |= CommonFlags::LINETYPE;
                    return true;
                }
                false
            }
            100 => {
                if self.subclass.is_none() {
                    if let Some(s) = record.value.as_str() {
                        self.subclass = Some(s.to_string());
                        self.flags |= CommonFlags::SUBCLASS;
                        return true;
                    }
                }
                // Further subclass markers stay retained and are echoed
                // by pre_write.
                false
            }
            330 => {
                if let Some(s) = record.value.as_str() {
                    self.reactors_owner = Some(s.to_string());
                    self.flags |= CommonFlags::REACTORS;
                    return true;
                }
                false
            }
            360 => {
                if let Some(s) = record.value.as_str() {
                    self.xdictionary_owner = Some(s.to_string());
                    self.flags |= CommonFlags::XDICTIONARY;
                    return true;
                }
                false
            }
            102 => {
                // The two ACAD application groups are reconstructed from
                // the owner fields on write; other 102 groups pass
                // through as retained records.
                matches!(
                    record.value.as_str(),
                    Some("{ACAD_REACTORS") | Some("{ACAD_XDICTIONARY") | Some("}")
                )
            }
            _ => false,
        }
    }

    /// Common fields exposed through the generic record interface.
    pub fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            8 => Some(Value::Text(self.layer_name().to_string())),
            62 => self
                .flags
                .contains(CommonFlags::COLOR)
                .then(|| Value::Int16(self.color_number)),
            67 => self
                .flags
                .contains(CommonFlags::PAPERSPACE)
                .then(|| Value::Int16(self.paperspace)),
            5 => self.handle.clone().map(Value::Text),
            6 => self.linetype.clone().map(Value::Text),
            100 => self.subclass.clone().map(Value::Text),
            330 => self.reactors_owner.clone().map(Value::Hex),
            360 => self.xdictionary_owner.clone().map(Value::Hex),
            _ => None,
        }
    }

    /// Codes the common writer emits itself; suppressed from the
    /// retained-record echo.
    pub fn suppresses(&self, group_code: i32) -> bool {
        matches!(group_code, 5 | 6 | 100 | 330 | 360)
    }

    /// Write the fixed entity preamble: name, handle, application
    /// groups, subclass marker, paperspace, layer, linetype, color,
    /// then any additional retained subclass markers.
    pub fn pre_write(&self, output: &mut Output<'_>, name: &str, retained: &[Record]) -> Result<()> {
        output.write_string(0, name)?;
        if let Some(handle) = &self.handle {
            output.write_string(5, handle)?;
        }
        if self.flags.contains(CommonFlags::REACTORS) {
            output.write_string(102, "{ACAD_REACTORS")?;
            output.write_string(330, self.reactors_owner.as_deref().unwrap_or(""))?;
            output.write_string(102, "}")?;
        }
        if self.flags.contains(CommonFlags::XDICTIONARY) {
            output.write_string(102, "{ACAD_XDICTIONARY")?;
            output.write_string(360, self.xdictionary_owner.as_deref().unwrap_or(""))?;
            output.write_string(102, "}")?;
        }
        if let Some(subclass) = &self.subclass {
            output.write_string(100, subclass)?;
        }
        if self.flags.contains(CommonFlags::PAPERSPACE) {
            output.write_i16(67, self.paperspace)?;
        }
        output.write_string(8, self.layer_name())?;
        if let Some(linetype) = &self.linetype {
            output.write_string(6, linetype)?;
        }
        if self.flags.contains(CommonFlags::COLOR) {
            output.write_i16(62, self.color_number)?;
        }
        for record in retained {
            if record.group_code == 100 {
                record.write(output)?;
            }
        }
        Ok(())
    }

    /// Exact number of records [`pre_write`](EntityCommon::pre_write)
    /// emits.
    pub fn count_records(&self, retained: &[Record]) -> usize {
        let mut count = 2; // entity name + layer
        if self.flags.contains(CommonFlags::HANDLE) {
            count += 1;
        }
        if self.flags.contains(CommonFlags::REACTORS) {
            count += 3;
        }
        if self.flags.contains(CommonFlags::XDICTIONARY) {
            count += 3;
        }
        if self.flags.contains(CommonFlags::SUBCLASS) {
            count += 1;
        }
        if self.flags.contains(CommonFlags::PAPERSPACE) {
            count += 1;
        }
        if self.flags.contains(CommonFlags::LINETYPE) {
            count += 1;
        }
        if self.flags.contains(CommonFlags::COLOR) {
            count += 1;
        }
        count + retained.iter().filter(|r| r.group_code == 100).count()
    }
}

impl Default for EntityCommon {
    fn default() -> Self {
        Self::new()
    }
}

/// Extrusion mix-in: entities carrying thickness (39) and an extrusion
/// direction (210/220/230).
#[derive(Debug, Clone, PartialEq)]
pub struct Extrusion {
    /// Extrusion direction; +Z when the entity lies in the world plane.
    pub direction: Vector3,
    /// Thickness along the extrusion direction.
    pub thickness: f64,
}

impl Extrusion {
    /// Default extrusion: +Z direction, zero thickness.
    pub fn new() -> Self {
        Extrusion {
            direction: Vector3::UNIT_Z,
            thickness: 0.0,
        }
    }

    /// Offer a record; consumes 39 and 210/220/230.
    pub fn handle_record(&mut self, record: &Record) -> bool {
        match record.group_code {
            39 => {
                if let Some(v) = record.value.as_double() {
                    self.thickness = v;
                    return true;
                }
                false
            }
            210 | 220 | 230 => {
                if let Some(v) = record.value.as_double() {
                    match record.group_code {
                        210 => self.direction.x = v,
                        220 => self.direction.y = v,
                        _ => self.direction.z = v,
                    }
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Extrusion fields exposed through the generic record interface.
    pub fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            39 => Some(Value::Double(self.thickness)),
            210 => Some(Value::Double(self.direction.x)),
            220 => Some(Value::Double(self.direction.y)),
            230 => Some(Value::Double(self.direction.z)),
            _ => None,
        }
    }

    /// Write thickness and direction; defaults are elided.
    pub fn write(&self, output: &mut Output<'_>) -> Result<()> {
        if self.thickness != 0.0 {
            output.write_f64(39, self.thickness)?;
        }
        if self.direction != Vector3::UNIT_Z {
            output.write_f64(210, self.direction.x)?;
            output.write_f64(220, self.direction.y)?;
            output.write_f64(230, self.direction.z)?;
        }
        Ok(())
    }

    /// Exact number of records [`write`](Extrusion::write) emits.
    pub fn count_records(&self) -> usize {
        let mut count = 0;
        if self.thickness != 0.0 {
            count += 1;
        }
        if self.direction != Vector3::UNIT_Z {
            count += 3;
        }
        count
    }
}

impl Default for Extrusion {
    fn default() -> Self {
        Self::new()
    }
}

/// What a geometry extraction produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    /// No geometry for this entity.
    None,
    /// Isolated points.
    Points,
    /// A polyline path through the vertices.
    Lines,
    /// Filled polygons; faces in `indices` are terminated by -1.
    Polygons,
}

/// Output buffers for [`Entity::extract_geometry`].
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Extracted vertices.
    pub vertices: Vec<Vector3>,
    /// Face indices for [`GeometryKind::Polygons`]; -1 terminates a
    /// face.
    pub indices: Vec<i32>,
    /// The entity's extrusion direction.
    pub extrusion: Vector3,
    /// The entity's thickness.
    pub thickness: f64,
}

impl Geometry {
    /// Create empty geometry buffers.
    pub fn new() -> Self {
        Geometry {
            vertices: Vec::new(),
            indices: Vec::new(),
            extrusion: Vector3::UNIT_Z,
            thickness: 0.0,
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

/// Curve tessellation parameters for geometry extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationParams {
    /// Fixed segment count for full circles; 0 or negative means derive
    /// the count from `max_chord_error`.
    pub segment_override: i32,
    /// Largest allowed distance between a chord and the true curve.
    pub max_chord_error: f64,
}

impl Default for TessellationParams {
    fn default() -> Self {
        TessellationParams {
            segment_override: 0,
            max_chord_error: 0.1,
        }
    }
}

/// Traversal callback: receives the running state and each delivered
/// entity; returning `false` stops the traversal.
pub type EntityCallback<'a> = dyn FnMut(&State, &dyn Entity) -> bool + 'a;

/// Behavior shared by every entity.
pub trait Entity: RecordHolder {
    /// The DXF entity name (the value of the leading 0 record).
    fn entity_name(&self) -> &str;

    /// The shared entity header.
    fn common(&self) -> &EntityCommon;

    /// Mutable access to the shared entity header.
    fn common_mut(&mut self) -> &mut EntityCommon;

    /// Serialize the entity, preamble first.
    fn write(&self, output: &mut Output<'_>) -> Result<()>;

    /// Exact number of records [`write`](Entity::write) emits.
    fn count_records(&self) -> usize;

    /// Extract renderable geometry. The default produces nothing.
    fn extract_geometry(
        &self,
        params: &TessellationParams,
        geometry: &mut Geometry,
    ) -> GeometryKind {
        let _ = (params, geometry);
        GeometryKind::None
    }
}

/// Tagged storage for the polymorphic entity set.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityType {
    Arc(Arc),
    Circle(Circle),
    Ellipse(Ellipse),
    Face3D(Face3D),
    Insert(Insert),
    Line(Line),
    LwPolyline(LwPolyline),
    MText(MText),
    Point(Point),
    Polyline(Polyline),
    Solid(Solid),
    Spline(Spline),
    Text(Text),
    Trace(Trace),
    Unknown(UnknownEntity),
}

impl EntityType {
    /// Create an entity from its DXF name; unrecognized names fall back
    /// to [`UnknownEntity`].
    pub fn create(name: &str) -> EntityType {
        match name {
            "3DFACE" => EntityType::Face3D(Face3D::new()),
            "ARC" => EntityType::Arc(Arc::new()),
            "CIRCLE" => EntityType::Circle(Circle::new()),
            "ELLIPSE" => EntityType::Ellipse(Ellipse::new()),
            "INSERT" => EntityType::Insert(Insert::new()),
            "LINE" => EntityType::Line(Line::new()),
            "LWPOLYLINE" => EntityType::LwPolyline(LwPolyline::new()),
            "MTEXT" => EntityType::MText(MText::new()),
            "POINT" => EntityType::Point(Point::new()),
            "POLYLINE" => EntityType::Polyline(Polyline::new()),
            "SOLID" => EntityType::Solid(Solid::new()),
            "SPLINE" => EntityType::Spline(Spline::new()),
            "TEXT" => EntityType::Text(Text::new()),
            "TRACE" => EntityType::Trace(Trace::new()),
            _ => EntityType::Unknown(UnknownEntity::new(name)),
        }
    }

    /// View as the behavior trait.
    pub fn as_entity(&self) -> &dyn Entity {
        match self {
            EntityType::Arc(e) => e,
            EntityType::Circle(e) => e,
            EntityType::Ellipse(e) => e,
            EntityType::Face3D(e) => e,
            EntityType::Insert(e) => e,
            EntityType::Line(e) => e,
            EntityType::LwPolyline(e) => e,
            EntityType::MText(e) => e,
            EntityType::Point(e) => e,
            EntityType::Polyline(e) => e,
            EntityType::Solid(e) => e,
            EntityType::Spline(e) => e,
            EntityType::Text(e) => e,
            EntityType::Trace(e) => e,
            EntityType::Unknown(e) => e,
        }
    }

    /// Mutable view as the behavior trait.
    pub fn as_entity_mut(&mut self) -> &mut dyn Entity {
        match self {
            EntityType::Arc(e) => e,
            EntityType::Circle(e) => e,
            EntityType::Ellipse(e) => e,
            EntityType::Face3D(e) => e,
            EntityType::Insert(e) => e,
            EntityType::Line(e) => e,
            EntityType::LwPolyline(e) => e,
            EntityType::MText(e) => e,
            EntityType::Point(e) => e,
            EntityType::Polyline(e) => e,
            EntityType::Solid(e) => e,
            EntityType::Spline(e) => e,
            EntityType::Text(e) => e,
            EntityType::Trace(e) => e,
            EntityType::Unknown(e) => e,
        }
    }

    /// The DXF entity name.
    pub fn entity_name(&self) -> &str {
        self.as_entity().entity_name()
    }

    /// The shared entity header.
    pub fn common(&self) -> &EntityCommon {
        self.as_entity().common()
    }

    /// Mutable access to the shared entity header.
    pub fn common_mut(&mut self) -> &mut EntityCommon {
        self.as_entity_mut().common_mut()
    }

    /// Read the entity body; composites continue past their record set
    /// into their sub-entity lists.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        match self {
            EntityType::Insert(e) => e.read(input),
            EntityType::Polyline(e) => e.read(input),
            other => other.as_entity_mut().read_records(input),
        }
    }

    /// Serialize the entity.
    pub fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.as_entity().write(output)
    }

    /// Exact number of records `write` emits.
    pub fn count_records(&self) -> usize {
        self.as_entity().count_records()
    }

    /// Extract renderable geometry.
    pub fn extract_geometry(
        &self,
        params: &TessellationParams,
        geometry: &mut Geometry,
    ) -> GeometryKind {
        self.as_entity().extract_geometry(params, geometry)
    }

    /// Traverse this entity, delivering it (or its expansion) to the
    /// callback. Returns `false` when the callback stopped the walk.
    pub fn traverse(&self, state: &State, callback: &mut EntityCallback<'_>) -> bool {
        if self.common().deleted {
            return true;
        }
        match self {
            EntityType::Insert(e) => e.traverse(state, callback),
            EntityType::Polyline(e) => e.traverse(state, callback),
            other => callback(state, other.as_entity()),
        }
    }

    /// Resolve layer names and, for INSERTs, block references.
    pub(crate) fn fix_references(
        &mut self,
        layers: &mut crate::layer::LayerRegistry,
        blocks: &BlockMap,
    ) -> Vec<String> {
        let mut unresolved = Vec::new();
        layers.resolve_entity_layer(self.common_mut());
        match self {
            EntityType::Insert(e) => {
                unresolved.extend(e.fix_references(layers, blocks));
            }
            EntityType::Polyline(e) => {
                for vertex in e.vertices_mut() {
                    layers.resolve_entity_layer(&mut vertex.common);
                }
            }
            _ => {}
        }
        unresolved
    }
}

/// Read entities until the named terminator; returns the list and the
/// terminator entity (its own records preserved so attributes like
/// layer and handle round-trip).
pub fn read_entities_until(
    input: &mut Input,
    terminator: &str,
) -> Result<(Vec<EntityType>, UnknownEntity)> {
    let mut entities = Vec::new();
    loop {
        let group_code = input.read_group_code()?;
        if group_code != 0 {
            return Err(DxfError::Parse(format!(
                "expected entity separator, got group code {} at {}",
                group_code,
                input.position_string()
            )));
        }
        let name = input.read_string()?;
        if name == terminator {
            let mut marker = UnknownEntity::new(&name);
            marker.read_records(input)?;
            return Ok((entities, marker));
        }
        let mut entity = EntityType::create(&name);
        entity.read(input)?;
        entities.push(entity);
    }
}
