//! ENTITIES section

use crate::entities::{read_entities_until, EntityType};
use crate::error::Result;
use crate::io::{Input, Output};

/// The ENTITIES section: the drawing's top-level entities.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntitiesSection {
    /// The entities in file order
    pub entities: Vec<EntityType>,
}

impl EntitiesSection {
    /// Create an empty section.
    pub fn new() -> Self {
        EntitiesSection {
            entities: Vec::new(),
        }
    }

    /// Append an entity.
    pub fn add_entity(&mut self, entity: EntityType) {
        self.entities.push(entity);
    }

    /// Read entities through ENDSEC.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        let (entities, _endsec) = read_entities_until(input, "ENDSEC")?;
        self.entities = entities;
        Ok(())
    }

    pub(crate) fn write_body(&self, output: &mut Output<'_>) -> Result<()> {
        for entity in &self.entities {
            if !entity.common().deleted {
                entity.write(output)?;
            }
        }
        Ok(())
    }

    pub(crate) fn count_body(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| !e.common().deleted)
            .map(|e| e.count_records())
            .sum()
    }
}
