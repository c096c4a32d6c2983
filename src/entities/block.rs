//! Block entity
//!
//! Strictly speaking a BLOCK is not an entity (it only appears in the
//! BLOCKS section), but it shares the common attributes and the record
//! protocol with real entities, so it is treated as one. Its body is an
//! ordered child-entity list terminated by ENDBLK.

use super::{
    read_entities_until, Entity, EntityCallback, EntityCommon, EntityType, UnknownEntity,
};
use crate::error::Result;
use crate::io::{Input, Output};
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::state::State;
use crate::types::Vector3;
use ahash::RandomState;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared, mutable reference to a block. INSERT entities hold these
/// after reference fix-up; the BLOCKS section owns the originals.
pub type BlockRef = Rc<RefCell<Block>>;

/// The model's name-to-block map, in definition order.
pub type BlockMap = IndexMap<String, BlockRef, RandomState>;

/// A BLOCK definition: a named, instanceable collection of entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Common entity data
    pub common: EntityCommon,
    /// Base point subtracted from child coordinates when the block is
    /// placed (codes 10/20/30)
    pub base_point: Vector3,
    /// Block-type flags (code 70)
    pub flags: i16,
    /// The ENDBLK marker, preserved so its attributes round-trip
    pub endblk: UnknownEntity,
    name: String,
    entities: Vec<EntityType>,
    records: Vec<Record>,
}

impl Block {
    /// Create an empty, unnamed block.
    pub fn new() -> Self {
        Block {
            common: EntityCommon::new(),
            base_point: Vector3::ZERO,
            flags: 0,
            endblk: UnknownEntity::new("ENDBLK"),
            name: String::new(),
            entities: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Create an empty block with a name.
    pub fn named(name: impl Into<String>) -> Self {
        Block {
            name: name.into(),
            ..Self::new()
        }
    }

    /// The block name INSERTs reference.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the block. The model's block map is keyed by name, so
    /// renaming a registered block requires re-registering it.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The child entities in definition order.
    pub fn entities(&self) -> &[EntityType] {
        &self.entities
    }

    /// Append a child entity.
    pub fn add_entity(&mut self, entity: EntityType) {
        self.entities.push(entity);
    }

    /// Insert a child entity at an index.
    pub fn insert_entity(&mut self, index: usize, entity: EntityType) {
        self.entities.insert(index, entity);
    }

    /// Remove and return the child entity at an index.
    pub fn remove_entity(&mut self, index: usize) -> EntityType {
        self.entities.remove(index)
    }

    /// Read the record set, then the child entities through ENDBLK.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        self.read_records(input)?;
        let (entities, endblk) = read_entities_until(input, "ENDBLK")?;
        self.entities = entities;
        self.endblk = endblk;
        Ok(())
    }

    /// Deliver the block itself, its children, and the ENDBLK marker.
    pub fn traverse(&self, state: &State, callback: &mut EntityCallback<'_>) -> bool {
        if self.common.deleted {
            return true;
        }
        if !callback(state, self) {
            return false;
        }
        for entity in &self.entities {
            if !entity.traverse(state, callback) {
                return false;
            }
        }
        callback(state, &self.endblk)
    }

    /// Resolve layer names and nested block references in the
    /// children.
    pub(crate) fn fix_references(
        &mut self,
        layers: &mut crate::layer::LayerRegistry,
        blocks: &BlockMap,
    ) -> Vec<String> {
        let mut unresolved = Vec::new();
        layers.resolve_entity_layer(&mut self.common);
        for entity in &mut self.entities {
            unresolved.extend(entity.fix_references(layers, blocks));
        }
        unresolved
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Block {
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
                    self.name = s.to_string();
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
            10 | 20 | 30 => {
                if let Some(v) = record.value.as_double() {
                    match record.group_code {
                        10 => self.base_point.x = v,
                        20 => self.base_point.y = v,
                        _ => self.base_point.z = v,
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
            2 => Some(Value::Text(self.name.clone())),
            70 => Some(Value::Int16(self.flags)),
            10 => Some(Value::Double(self.base_point.x)),
            20 => Some(Value::Double(self.base_point.y)),
            30 => Some(Value::Double(self.base_point.z)),
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

impl Entity for Block {
    fn entity_name(&self) -> &str {
        "BLOCK"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        output.write_string(2, &self.name)?;
        output.write_i16(70, self.flags)?;
        output.write_point(10, self.base_point)?;
        self.write_retained(output)?;
        for entity in &self.entities {
            if !entity.common().deleted {
                entity.write(output)?;
            }
        }
        self.endblk.write(output)
    }

    fn count_records(&self) -> usize {
        self.common.count_records(&self.records)
            + 5 // name + flags + base point
            + self.count_retained()
            + self
                .entities
                .iter()
                .filter(|e| !e.common().deleted)
                .map(|e| e.count_records())
                .sum::<usize>()
            + self.endblk.count_records()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Point;

    #[test]
    fn test_named_block() {
        let block = Block::named("B1");
        assert_eq!(block.name(), "B1");
        assert_eq!(block.entity_name(), "BLOCK");
    }

    #[test]
    fn test_child_entity_order() {
        let mut block = Block::named("B1");
        block.add_entity(EntityType::Point(Point::at(Vector3::ZERO)));
        block.add_entity(EntityType::Point(Point::at(Vector3::UNIT_X)));
        block.insert_entity(1, EntityType::Line(crate::entities::Line::new()));
        assert_eq!(block.entities().len(), 3);
        assert_eq!(block.entities()[1].entity_name(), "LINE");
        let removed = block.remove_entity(1);
        assert_eq!(removed.entity_name(), "LINE");
    }

    #[test]
    fn test_traverse_delivers_block_children_endblk() {
        let mut block = Block::named("B1");
        block.add_entity(EntityType::Point(Point::at(Vector3::ZERO)));
        let state = State::default();
        let mut names = Vec::new();
        block.traverse(&state, &mut |_, entity| {
            names.push(entity.entity_name().to_string());
            true
        });
        assert_eq!(names, vec!["BLOCK", "POINT", "ENDBLK"]);
    }

    #[test]
    fn test_count_matches_write() {
        let mut block = Block::named("B1");
        block.base_point = Vector3::new(1.0, 2.0, 3.0);
        block.add_entity(EntityType::Point(Point::at(Vector3::ZERO)));
        let mut buf = Vec::new();
        {
            let mut out = Output::new(&mut buf);
            block.write(&mut out).unwrap();
            assert_eq!(out.written_records(), block.count_records());
        }
    }
}
