//! The drawing model
//!
//! A model owns the file's sections in order, the layer registry, the
//! block map, and the handle high-water mark. Reading is a two-phase
//! affair: sections parse independently, then a fix-up pass resolves
//! layer names and INSERT block references.

use crate::entities::{Block, BlockMap, BlockRef, Entity, EntityType};
use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use crate::layer::{LayerRef, LayerRegistry};
use crate::notification::{NotificationCollection, NotificationType};
use crate::record::{Record, Value};
use crate::sections::{
    BlocksSection, EntitiesSection, HeaderSection, Section, TablesSection,
};
use crate::state::{State, StateFlags};
use crate::types::{DxfVersion, Handle};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// A loaded (or under-construction) DXF drawing.
#[derive(Debug, Default)]
pub struct Model {
    sections: Vec<Section>,
    layers: LayerRegistry,
    blocks: BlockMap,
    largest_handle: u64,
    header_comments: Vec<Record>,
    /// Non-fatal issues from the last read.
    pub notifications: NotificationCollection,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Model::default()
    }

    /// Clear all state; called by [`read`](Model::read) before
    /// loading.
    pub fn init(&mut self) {
        self.sections.clear();
        self.layers.clear();
        self.blocks.clear();
        self.largest_handle = 0;
        self.header_comments.clear();
        self.notifications.clear();
    }

    /// Load a model from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Model> {
        let mut input = Input::from_file(path)?;
        let mut model = Model::new();
        model.read(&mut input)?;
        Ok(model)
    }

    /// Read the model from an input stream.
    ///
    /// On failure all partially-read state is discarded: the model
    /// comes back empty, never half-loaded.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        self.init();
        match self.read_inner(input) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.init();
                Err(e)
            }
        }
    }

    fn read_inner(&mut self, input: &mut Input) -> Result<()> {
        loop {
            let group_code = input.read_group_code()?;
            // Comments at the top level are preserved and re-emitted
            // ahead of the first section.
            for comment in input.take_comments() {
                self.header_comments
                    .push(Record::new(999, Value::Text(comment)));
            }
            if group_code != 0 {
                return Err(DxfError::Parse(format!(
                    "expected SECTION or EOF, got group code {} at {}",
                    group_code,
                    input.position_string()
                )));
            }
            let keyword = input.read_string()?;
            match keyword.as_str() {
                "EOF" => break,
                "SECTION" => {
                    let name_code = input.read_group_code()?;
                    if name_code != 2 {
                        return Err(DxfError::Parse(format!(
                            "expected section name, got group code {} at {}",
                            name_code,
                            input.position_string()
                        )));
                    }
                    let name = input.read_string()?;
                    let mut section = Section::create(&name);
                    section.read(input)?;
                    // Comments inside a section are tolerated but not
                    // preserved.
                    input.take_comments();
                    self.sections.push(section);
                }
                other => {
                    return Err(DxfError::Parse(format!(
                        "unexpected {} at top level at {}",
                        other,
                        input.position_string()
                    )));
                }
            }
        }
        self.register_handle(Handle::new(input.largest_handle()));
        self.fix_references();
        Ok(())
    }

    /// Resolve cross-references: register LAYER table entries, build
    /// the block map, resolve entity layers and INSERT block names.
    pub fn fix_references(&mut self) {
        let Model {
            sections,
            layers,
            blocks,
            notifications,
            ..
        } = self;

        for section in sections.iter() {
            if let Section::Tables(tables) = section {
                for table in &tables.tables {
                    if table.name() != "LAYER" {
                        continue;
                    }
                    for entry in &table.entries {
                        if let crate::tables::TableEntry::Layer(layer) = entry {
                            layers.register_table_entry(layer);
                        }
                    }
                }
            }
        }

        blocks.clear();
        for section in sections.iter() {
            if let Section::Blocks(blocks_section) = section {
                for block in &blocks_section.blocks {
                    let name = block.borrow().name().to_string();
                    if name.is_empty() {
                        continue;
                    }
                    if blocks.contains_key(&name) {
                        notifications.notify(
                            NotificationType::Warning,
                            format!("duplicate block name {}, first definition wins", name),
                        );
                        continue;
                    }
                    blocks.insert(name, block.clone());
                }
            }
        }

        let mut unresolved = Vec::new();
        for section in sections.iter_mut() {
            match section {
                Section::Blocks(blocks_section) => {
                    for block in &blocks_section.blocks {
                        unresolved.extend(block.borrow_mut().fix_references(layers, blocks));
                    }
                }
                Section::Entities(entities_section) => {
                    for entity in &mut entities_section.entities {
                        unresolved.extend(entity.fix_references(layers, blocks));
                    }
                }
                _ => {}
            }
        }
        for name in unresolved {
            notifications.notify(
                NotificationType::Warning,
                format!("INSERT references unknown block {}", name),
            );
        }
    }

    /// Serialize the model: header comments, every section, EOF.
    ///
    /// When any handle has been registered, the HEADER's `$HANDSEED`
    /// variable (when present) is refreshed to the current high-water
    /// mark first.
    pub fn write(&mut self, output: &mut Output<'_>) -> Result<()> {
        if self.largest_handle > 0 {
            let seed = Handle::new(self.largest_handle).to_hex();
            if let Some(header) = self.header_section_mut() {
                if header.get_variable("$HANDSEED").is_some() {
                    header.set_variable("$HANDSEED", vec![Record::new(5, Value::Text(seed))]);
                }
            }
        }
        for comment in &self.header_comments {
            comment.write(output)?;
        }
        for section in &self.sections {
            output.write_string(0, "SECTION")?;
            section.write(output)?;
        }
        output.write_string(0, "EOF")?;
        output.flush()
    }

    /// Exact number of records [`write`](Model::write) emits; feeds
    /// the output progress callback.
    pub fn count_records(&self) -> usize {
        self.header_comments.len()
            + self
                .sections
                .iter()
                .map(|s| 1 + s.count_records())
                .sum::<usize>()
            + 1
    }

    // ---- sections ---------------------------------------------------------

    /// The sections in file order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Append a section.
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// The HEADER section, when present.
    pub fn header_section(&self) -> Option<&HeaderSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Header(header) => Some(header),
            _ => None,
        })
    }

    /// Mutable access to the HEADER section.
    pub fn header_section_mut(&mut self) -> Option<&mut HeaderSection> {
        self.sections.iter_mut().find_map(|s| match s {
            Section::Header(header) => Some(header),
            _ => None,
        })
    }

    /// The TABLES section, when present.
    pub fn tables_section(&self) -> Option<&TablesSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Tables(tables) => Some(tables),
            _ => None,
        })
    }

    /// The BLOCKS section, when present.
    pub fn blocks_section(&self) -> Option<&BlocksSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Blocks(blocks) => Some(blocks),
            _ => None,
        })
    }

    /// The ENTITIES section, when present.
    pub fn entities_section(&self) -> Option<&EntitiesSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Entities(entities) => Some(entities),
            _ => None,
        })
    }

    /// Mutable access to the ENTITIES section, creating it when
    /// missing.
    pub fn entities_section_mut(&mut self) -> &mut EntitiesSection {
        let missing = !self
            .sections
            .iter()
            .any(|s| matches!(s, Section::Entities(_)));
        if missing {
            self.sections
                .push(Section::Entities(EntitiesSection::new()));
        }
        self.sections
            .iter_mut()
            .find_map(|s| match s {
                Section::Entities(entities) => Some(entities),
                _ => None,
            })
            .expect("entities section just ensured")
    }

    /// Append an entity to the ENTITIES section.
    pub fn add_entity(&mut self, entity: EntityType) {
        self.entities_section_mut().add_entity(entity);
    }

    /// The header comments (group code 999 records ahead of the first
    /// section).
    pub fn header_comments(&self) -> &[Record] {
        &self.header_comments
    }

    // ---- layers -----------------------------------------------------------

    /// Add a layer, or return the existing one with the same name.
    pub fn add_layer(&mut self, name: &str, color_number: i16, flags: i16) -> LayerRef {
        self.layers.add_layer(name, color_number, flags)
    }

    /// Look up a layer by name.
    pub fn get_layer(&self, name: &str) -> Option<LayerRef> {
        self.layers.get(name)
    }

    /// The layer registry.
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    // ---- blocks -----------------------------------------------------------

    /// Register a block: adds it to the block map and the BLOCKS
    /// section (created when missing). Fails on a duplicate name.
    pub fn add_block(&mut self, block: Block) -> Result<BlockRef> {
        let name = block.name().to_string();
        if name.is_empty() {
            return Err(DxfError::Custom("block has no name".to_string()));
        }
        if self.blocks.contains_key(&name) {
            return Err(DxfError::DuplicateBlock(name));
        }
        let block = Rc::new(RefCell::new(block));
        let missing = !self
            .sections
            .iter()
            .any(|s| matches!(s, Section::Blocks(_)));
        if missing {
            self.sections.push(Section::Blocks(BlocksSection::new()));
        }
        if let Some(Section::Blocks(blocks_section)) = self
            .sections
            .iter_mut()
            .find(|s| matches!(s, Section::Blocks(_)))
        {
            blocks_section.blocks.push(block.clone());
        }
        self.blocks.insert(name, block.clone());
        Ok(block)
    }

    /// Look up a block by name.
    pub fn find_block(&self, name: &str) -> Option<BlockRef> {
        self.blocks.get(name).cloned()
    }

    // ---- handles ----------------------------------------------------------

    /// Raise the handle high-water mark.
    pub fn register_handle(&mut self, handle: Handle) {
        if handle.value() > self.largest_handle {
            self.largest_handle = handle.value();
        }
    }

    /// Raise the handle high-water mark from a hex string.
    pub fn register_handle_str(&mut self, handle: &str) {
        if let Some(handle) = Handle::from_hex(handle) {
            self.register_handle(handle);
        }
    }

    /// The largest handle seen or issued so far.
    pub fn largest_handle(&self) -> u64 {
        self.largest_handle
    }

    /// Issue a handle strictly greater than every handle seen or
    /// issued before.
    pub fn get_unique_handle(&mut self) -> Handle {
        self.largest_handle += 1;
        Handle::new(self.largest_handle)
    }

    /// Issue a unique handle formatted as lowercase hex.
    pub fn get_unique_handle_hex_string(&mut self) -> String {
        self.get_unique_handle().to_hex()
    }

    // ---- traversal and version -------------------------------------------

    /// Walk the model's entities with a running transform.
    ///
    /// When `traverse_blocks` is set the BLOCKS section is walked
    /// first. `explode_inserts` replaces each INSERT by its block's
    /// entities under the instance transform; `traverse_vertices`
    /// additionally delivers POLYLINE vertices. Returns `false` when
    /// the callback stopped the walk.
    pub fn traverse_entities<F>(
        &self,
        traverse_blocks: bool,
        explode_inserts: bool,
        traverse_vertices: bool,
        mut callback: F,
    ) -> bool
    where
        F: FnMut(&State, &dyn Entity) -> bool,
    {
        let mut flags = StateFlags::empty();
        if explode_inserts {
            flags |= StateFlags::EXPLODE_INSERTS;
        }
        if traverse_vertices {
            flags |= StateFlags::TRAVERSE_POLYLINE_VERTICES;
        }
        let state = State::new(flags);

        if traverse_blocks {
            if let Some(blocks_section) = self.blocks_section() {
                for block in &blocks_section.blocks {
                    if !block.borrow().traverse(&state, &mut callback) {
                        return false;
                    }
                }
            }
        }
        if let Some(entities_section) = self.entities_section() {
            for entity in &entities_section.entities {
                if !entity.traverse(&state, &mut callback) {
                    return false;
                }
            }
        }
        true
    }

    /// The drawing database version from the HEADER's `$ACADVER`
    /// variable.
    pub fn dxf_version(&self) -> Option<DxfVersion> {
        let header = self.header_section()?;
        let records = header.get_variable("$ACADVER")?;
        let first = records.first()?;
        if first.group_code != 1 {
            return None;
        }
        DxfVersion::from_acadver(first.value.as_str()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(data: &str) -> Model {
        let mut input = Input::new(Cursor::new(data.as_bytes().to_vec())).unwrap();
        let mut model = Model::new();
        model.read(&mut input).unwrap();
        model
    }

    #[test]
    fn test_minimal_file() {
        let model = parse("  0\nSECTION\n  2\nENTITIES\n  0\nENDSEC\n  0\nEOF\n");
        assert_eq!(model.sections().len(), 1);
        assert_eq!(model.entities_section().unwrap().entities.len(), 0);
        // 0/SECTION + 2/ENTITIES + 0/ENDSEC + 0/EOF
        assert_eq!(model.count_records(), 4);
    }

    #[test]
    fn test_garbage_at_top_level_fails() {
        let mut input = Input::new(Cursor::new("  0\nBANANA\n".as_bytes().to_vec())).unwrap();
        let mut model = Model::new();
        assert!(model.read(&mut input).is_err());
        // Partial state is discarded
        assert!(model.sections().is_empty());
    }

    #[test]
    fn test_header_comments_roundtrip() {
        let model = parse(
            "999\ncreated by dime\n  0\nSECTION\n  2\nENTITIES\n  0\nENDSEC\n  0\nEOF\n",
        );
        assert_eq!(model.header_comments().len(), 1);
        assert_eq!(model.count_records(), 5);
    }

    #[test]
    fn test_unique_handles() {
        let mut model = Model::new();
        model.register_handle_str("FF");
        assert_eq!(model.get_unique_handle(), Handle::new(0x100));
        assert_eq!(model.get_unique_handle_hex_string(), "101");
    }

    #[test]
    fn test_add_block_rejects_duplicates() {
        let mut model = Model::new();
        model.add_block(Block::named("B1")).unwrap();
        let err = model.add_block(Block::named("B1")).unwrap_err();
        assert!(matches!(err, DxfError::DuplicateBlock(_)));
        assert!(model.find_block("B1").is_some());
    }

    #[test]
    fn test_dxf_version() {
        let model = parse(
            "  0\nSECTION\n  2\nHEADER\n  9\n$ACADVER\n  1\nAC1015\n  0\nENDSEC\n  0\nEOF\n",
        );
        assert_eq!(model.dxf_version(), Some(DxfVersion::R2000));
    }
}
