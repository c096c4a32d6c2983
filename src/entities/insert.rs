//! Insert entity
//!
//! An INSERT places a named block. The name is stored at parse time and
//! resolved to a block reference in a separate post-load pass, so
//! forward references and missing blocks never break reading.

use super::block::{BlockMap, BlockRef};
use super::{
    Entity, EntityCallback, EntityCommon, EntityType, Geometry, GeometryKind, TessellationParams,
    UnknownEntity,
};
use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use crate::layer::LayerRegistry;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::state::State;
use crate::types::{Matrix4, Vector3};

/// An INSERT entity: a placed block reference, optionally with
/// attribute sub-entities.
#[derive(Debug, Clone)]
pub struct Insert {
    /// Common entity data
    pub common: EntityCommon,
    /// Insertion point (codes 10/20/30)
    pub insertion_point: Vector3,
    /// Per-axis scale (codes 41/42/43)
    pub scale: Vector3,
    /// Rotation angle in degrees (code 50)
    pub rotation_angle: f64,
    /// Column count (code 70)
    pub column_count: i16,
    /// Row count (code 71)
    pub row_count: i16,
    /// Column spacing (code 44)
    pub column_spacing: f64,
    /// Row spacing (code 45)
    pub row_spacing: f64,
    /// Extrusion direction (codes 210/220/230)
    pub extrusion_dir: Vector3,
    /// Attribute sub-entities (present when code 66 = 1)
    pub attributes: Vec<EntityType>,
    /// The SEQEND marker closing the attribute list
    pub seqend: Option<UnknownEntity>,
    block_name: String,
    block: Option<BlockRef>,
    attributes_follow: bool,
    records: Vec<Record>,
}

impl Insert {
    /// Create an insert with no block name.
    pub fn new() -> Self {
        Insert {
            common: EntityCommon::new(),
            insertion_point: Vector3::ZERO,
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation_angle: 0.0,
            column_count: 1,
            row_count: 1,
            column_spacing: 0.0,
            row_spacing: 0.0,
            extrusion_dir: Vector3::UNIT_Z,
            attributes: Vec::new(),
            seqend: None,
            block_name: String::new(),
            block: None,
            attributes_follow: false,
            records: Vec::new(),
        }
    }

    /// The referenced block's name.
    pub fn block_name(&self) -> &str {
        &self.block_name
    }

    /// Point this insert at a block; stores the name and the resolved
    /// reference.
    pub fn set_block(&mut self, block: BlockRef) {
        self.block_name = block.borrow().name().to_string();
        self.block = Some(block);
    }

    /// The resolved block reference, populated by the model's fix-up
    /// pass.
    pub fn block(&self) -> Option<&BlockRef> {
        self.block.as_ref()
    }

    /// Read the record set, then the attribute entities when the
    /// attributes-follow flag was present.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        self.read_records(input)?;
        if !self.attributes_follow {
            return Ok(());
        }
        loop {
            let group_code = input.read_group_code()?;
            if group_code != 0 {
                return Err(DxfError::Parse(format!(
                    "expected attribute entity or SEQEND, got group code {} at {}",
                    group_code,
                    input.position_string()
                )));
            }
            let name = input.read_string()?;
            if name == "SEQEND" {
                let mut seqend = UnknownEntity::new("SEQEND");
                seqend.read_records(input)?;
                self.seqend = Some(seqend);
                return Ok(());
            }
            let mut entity = EntityType::create(&name);
            entity.read(input)?;
            self.attributes.push(entity);
        }
    }

    /// Resolve the block name against the model's block map; returns
    /// the names that stayed unresolved (for warning reporting).
    pub(crate) fn fix_references(
        &mut self,
        layers: &mut LayerRegistry,
        blocks: &BlockMap,
    ) -> Vec<String> {
        let mut unresolved = Vec::new();
        if self.block.is_none() && !self.block_name.is_empty() {
            match blocks.get(&self.block_name) {
                Some(block) => self.block = Some(block.clone()),
                None => unresolved.push(self.block_name.clone()),
            }
        }
        for attribute in &mut self.attributes {
            unresolved.extend(attribute.fix_references(layers, blocks));
        }
        unresolved
    }

    /// The per-instance placement for one (row, column) cell.
    fn instance_matrix(&self, parent: &Matrix4, base_point: Vector3, row: i16, col: i16) -> Matrix4 {
        let mut m = *parent;
        if self.extrusion_dir != Vector3::UNIT_Z {
            m = m * Matrix4::arbitrary_axis(self.extrusion_dir);
        }
        let offset = self.insertion_point
            + Vector3::new(
                f64::from(col) * self.column_spacing,
                f64::from(row) * self.row_spacing,
                0.0,
            );
        m * Matrix4::translation(offset)
            * Matrix4::rotation_z(self.rotation_angle.to_radians())
            * Matrix4::scaling(self.scale)
            * Matrix4::translation(-base_point)
    }

    /// Deliver the insert, or — when the state explodes inserts and the
    /// block is resolved — the block's entities under each (row,
    /// column) placement.
    pub fn traverse(&self, state: &State, callback: &mut EntityCallback<'_>) -> bool {
        let block = match (&self.block, state.explode_inserts()) {
            (Some(block), true) => block,
            _ => return callback(state, self),
        };
        let block = block.borrow();
        for row in 0..self.row_count.max(1) {
            for col in 0..self.column_count.max(1) {
                let matrix = self.instance_matrix(state.matrix(), block.base_point, row, col);
                let sub_state = state.with_matrix(matrix);
                for child in block.entities() {
                    if !child.traverse(&sub_state, callback) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl Default for Insert {
    fn default() -> Self {
        Self::new()
    }
}

// The resolved block reference is identity, not content: two inserts
// compare equal when they name the same block, whether or not the
// reference is resolved. This also keeps comparison well-founded for
// self-referential block definitions.
impl PartialEq for Insert {
    fn eq(&self, other: &Self) -> bool {
        self.common == other.common
            && self.insertion_point == other.insertion_point
            && self.scale == other.scale
            && self.rotation_angle == other.rotation_angle
            && self.column_count == other.column_count
            && self.row_count == other.row_count
            && self.column_spacing == other.column_spacing
            && self.row_spacing == other.row_spacing
            && self.extrusion_dir == other.extrusion_dir
            && self.attributes == other.attributes
            && self.seqend == other.seqend
            && self.block_name == other.block_name
            && self.attributes_follow == other.attributes_follow
            && self.records == other.records
    }
}

impl RecordHolder for Insert {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn handle_record(&mut self, record: &Record) -> bool {
        match record.group_code {
            2 => {
                if let Some(s) = record.value.as_str() {
                    self.block_name = s.to_string();
                    return true;
                }
                false
            }
            66 => {
                if let Some(v) = record.value.as_int() {
                    self.attributes_follow = v == 1;
                    return true;
                }
                false
            }
            10 | 20 | 30 => {
                if let Some(v) = record.value.as_double() {
                    match record.group_code {
                        10 => self.insertion_point.x = v,
                        20 => self.insertion_point.y = v,
                        _ => self.insertion_point.z = v,
                    }
                    return true;
                }
                false
            }
            41 | 42 | 43 => {
                if let Some(v) = record.value.as_double() {
                    match record.group_code {
                        41 => self.scale.x = v,
                        42 => self.scale.y = v,
                        _ => self.scale.z = v,
                    }
                    return true;
                }
                false
            }
            50 => {
                if let Some(v) = record.value.as_double() {
                    self.rotation_angle = v;
                    return true;
                }
                false
            }
            70 => {
                if let Some(v) = record.value.as_int() {
                    self.column_count = v as i16;
                    return true;
                }
                false
            }
            71 => {
                if let Some(v) = record.value.as_int() {
                    self.row_count = v as i16;
                    return true;
                }
                false
            }
            44 => {
                if let Some(v) = record.value.as_double() {
                    self.column_spacing = v;
                    return true;
                }
                false
            }
            45 => {
                if let Some(v) = record.value.as_double() {
                    self.row_spacing = v;
                    return true;
                }
                false
            }
            210 | 220 | 230 => {
                if let Some(v) = record.value.as_double() {
                    match record.group_code {
                        210 => self.extrusion_dir.x = v,
                        220 => self.extrusion_dir.y = v,
                        _ => self.extrusion_dir.z = v,
                    }
                    return true;
                }
                false
            }
            _ => self.common.handle_common_record(record),
        }
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            2 => Some(Value::Text(self.block_name.clone())),
            66 => Some(Value::Int16(i16::from(self.attributes_follow))),
            10 => Some(Value::Double(self.insertion_point.x)),
            20 => Some(Value::Double(self.insertion_point.y)),
            30 => Some(Value::Double(self.insertion_point.z)),
            41 => Some(Value::Double(self.scale.x)),
            42 => Some(Value::Double(self.scale.y)),
            43 => Some(Value::Double(self.scale.z)),
            50 => Some(Value::Double(self.rotation_angle)),
            70 => Some(Value::Int16(self.column_count)),
            71 => Some(Value::Int16(self.row_count)),
            44 => Some(Value::Double(self.column_spacing)),
            45 => Some(Value::Double(self.row_spacing)),
            210 => Some(Value::Double(self.extrusion_dir.x)),
            220 => Some(Value::Double(self.extrusion_dir.y)),
            230 => Some(Value::Double(self.extrusion_dir.z)),
            _ => self.common.field_record(group_code),
        }
    }

    fn should_write_record(&self, group_code: i32) -> bool {
        !self.common.suppresses(group_code)
    }

    fn reserved_record(&self, group_code: i32) -> bool {
        // The block name must go through set_block so the resolved
        // reference stays consistent.
        group_code == 8 || group_code == 2
    }
}

impl Entity for Insert {
    fn entity_name(&self) -> &str {
        "INSERT"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        let has_attributes = !self.attributes.is_empty();
        if has_attributes {
            output.write_i16(66, 1)?;
        }
        output.write_string(2, &self.block_name)?;
        output.write_point(10, self.insertion_point)?;
        if self.scale != Vector3::new(1.0, 1.0, 1.0) {
            output.write_f64(41, self.scale.x)?;
            output.write_f64(42, self.scale.y)?;
            output.write_f64(43, self.scale.z)?;
        }
        if self.rotation_angle != 0.0 {
            output.write_f64(50, self.rotation_angle)?;
        }
        if self.column_count != 1 {
            output.write_i16(70, self.column_count)?;
        }
        if self.row_count != 1 {
            output.write_i16(71, self.row_count)?;
        }
        if self.column_spacing != 0.0 {
            output.write_f64(44, self.column_spacing)?;
        }
        if self.row_spacing != 0.0 {
            output.write_f64(45, self.row_spacing)?;
        }
        if self.extrusion_dir != Vector3::UNIT_Z {
            output.write_f64(210, self.extrusion_dir.x)?;
            output.write_f64(220, self.extrusion_dir.y)?;
            output.write_f64(230, self.extrusion_dir.z)?;
        }
        self.write_retained(output)?;
        if has_attributes {
            for attribute in &self.attributes {
                if !attribute.common().deleted {
                    attribute.write(output)?;
                }
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
        let has_attributes = !self.attributes.is_empty();
        count += usize::from(has_attributes);
        count += 4; // block name + insertion point
        if self.scale != Vector3::new(1.0, 1.0, 1.0) {
            count += 3;
        }
        count += usize::from(self.rotation_angle != 0.0);
        count += usize::from(self.column_count != 1);
        count += usize::from(self.row_count != 1);
        count += usize::from(self.column_spacing != 0.0);
        count += usize::from(self.row_spacing != 0.0);
        if self.extrusion_dir != Vector3::UNIT_Z {
            count += 3;
        }
        count += self.count_retained();
        if has_attributes {
            count += self
                .attributes
                .iter()
                .filter(|a| !a.common().deleted)
                .map(|a| a.count_records())
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
        geometry.extrusion = self.extrusion_dir;
        GeometryKind::None
    }
}
