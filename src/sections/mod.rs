//! File sections
//!
//! A DXF file is a sequence of named sections. Each known section name
//! gets its own parser; anything else is preserved raw by the unknown
//! section.

use crate::error::Result;
use crate::io::{Input, Output};

pub mod blocks;
pub mod classes;
pub mod entities;
pub mod header;
pub mod objects;
pub mod tables;
pub mod unknown;

pub use blocks::BlocksSection;
pub use classes::{ClassesSection, DxfClass};
pub use entities::EntitiesSection;
pub use header::HeaderSection;
pub use objects::{DxfObject, ObjectsSection};
pub use tables::TablesSection;
pub use unknown::UnknownSection;

/// A file section, dispatched by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Header(HeaderSection),
    Classes(ClassesSection),
    Tables(TablesSection),
    Blocks(BlocksSection),
    Entities(EntitiesSection),
    Objects(ObjectsSection),
    Unknown(UnknownSection),
}

impl Section {
    /// Create a section from its name (the value of the 2 record after
    /// 0/SECTION).
    pub fn create(name: &str) -> Section {
        match name {
            "HEADER" => Section::Header(HeaderSection::new()),
            "CLASSES" => Section::Classes(ClassesSection::new()),
            "TABLES" => Section::Tables(TablesSection::new()),
            "BLOCKS" => Section::Blocks(BlocksSection::new()),
            "ENTITIES" => Section::Entities(EntitiesSection::new()),
            "OBJECTS" => Section::Objects(ObjectsSection::new()),
            _ => Section::Unknown(UnknownSection::new(name)),
        }
    }

    /// The section name.
    pub fn name(&self) -> &str {
        match self {
            Section::Header(_) => "HEADER",
            Section::Classes(_) => "CLASSES",
            Section::Tables(_) => "TABLES",
            Section::Blocks(_) => "BLOCKS",
            Section::Entities(_) => "ENTITIES",
            Section::Objects(_) => "OBJECTS",
            Section::Unknown(section) => section.name(),
        }
    }

    /// Read the section body through ENDSEC. The caller has consumed
    /// 0/SECTION and 2/name.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        match self {
            Section::Header(section) => section.read(input),
            Section::Classes(section) => section.read(input),
            Section::Tables(section) => section.read(input),
            Section::Blocks(section) => section.read(input),
            Section::Entities(section) => section.read(input),
            Section::Objects(section) => section.read(input),
            Section::Unknown(section) => section.read(input),
        }
    }

    /// Write the section body: 2/name through 0/ENDSEC. The caller
    /// writes the leading 0/SECTION.
    pub fn write(&self, output: &mut Output<'_>) -> Result<()> {
        output.write_string(2, self.name())?;
        match self {
            Section::Header(section) => section.write_body(output)?,
            Section::Classes(section) => section.write_body(output)?,
            Section::Tables(section) => section.write_body(output)?,
            Section::Blocks(section) => section.write_body(output)?,
            Section::Entities(section) => section.write_body(output)?,
            Section::Objects(section) => section.write_body(output)?,
            Section::Unknown(section) => section.write_body(output)?,
        }
        output.write_string(0, "ENDSEC")
    }

    /// Exact number of records `write` emits (the name record, the
    /// body, and ENDSEC).
    pub fn count_records(&self) -> usize {
        let body = match self {
            Section::Header(section) => section.count_body(),
            Section::Classes(section) => section.count_body(),
            Section::Tables(section) => section.count_body(),
            Section::Blocks(section) => section.count_body(),
            Section::Entities(section) => section.count_body(),
            Section::Objects(section) => section.count_body(),
            Section::Unknown(section) => section.count_body(),
        };
        2 + body
    }
}
