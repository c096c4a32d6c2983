//! BLOCKS section

use crate::entities::{Block, BlockRef, Entity};
use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use std::cell::RefCell;
use std::rc::Rc;

/// The BLOCKS section: the block definitions, in file order.
#[derive(Debug, Clone, Default)]
pub struct BlocksSection {
    /// The block definitions
    pub blocks: Vec<BlockRef>,
}

impl BlocksSection {
    /// Create an empty section.
    pub fn new() -> Self {
        BlocksSection { blocks: Vec::new() }
    }

    /// Append a block definition and return the shared reference.
    pub fn add_block(&mut self, block: Block) -> BlockRef {
        let block = Rc::new(RefCell::new(block));
        self.blocks.push(block.clone());
        block
    }

    /// Read blocks through ENDSEC.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        loop {
            let group_code = input.read_group_code()?;
            if group_code != 0 {
                return Err(DxfError::Parse(format!(
                    "expected BLOCK, got group code {} at {}",
                    group_code,
                    input.position_string()
                )));
            }
            let name = input.read_string()?;
            match name.as_str() {
                "ENDSEC" => return Ok(()),
                "BLOCK" => {
                    let mut block = Block::new();
                    block.read(input)?;
                    self.blocks.push(Rc::new(RefCell::new(block)));
                }
                other => {
                    return Err(DxfError::Parse(format!(
                        "unexpected {} in BLOCKS section at {}",
                        other,
                        input.position_string()
                    )));
                }
            }
        }
    }

    pub(crate) fn write_body(&self, output: &mut Output<'_>) -> Result<()> {
        for block in &self.blocks {
            let block = block.borrow();
            if !block.common.deleted {
                block.write(output)?;
            }
        }
        Ok(())
    }

    pub(crate) fn count_body(&self) -> usize {
        self.blocks
            .iter()
            .map(|b| b.borrow())
            .filter(|b| !b.common.deleted)
            .map(|b| b.count_records())
            .sum()
    }
}

impl PartialEq for BlocksSection {
    fn eq(&self, other: &Self) -> bool {
        self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(other.blocks.iter())
                .all(|(a, b)| *a.borrow() == *b.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_blocks() {
        let data = "  0\nBLOCK\n  8\n0\n  2\nB1\n 70\n     0\n 10\n1.0\n 20\n2.0\n 30\n3.0\n  0\nPOINT\n 10\n0.0\n 20\n0.0\n 30\n0.0\n  0\nENDBLK\n  0\nENDSEC\n";
        let mut input = Input::new(Cursor::new(data.as_bytes().to_vec())).unwrap();
        let mut section = BlocksSection::new();
        section.read(&mut input).unwrap();
        assert_eq!(section.blocks.len(), 1);
        let block = section.blocks[0].borrow();
        assert_eq!(block.name(), "B1");
        assert_eq!(block.entities().len(), 1);
        assert_eq!(block.entities()[0].entity_name(), "POINT");
    }
}
