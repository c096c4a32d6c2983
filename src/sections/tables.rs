//! TABLES section

use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use crate::tables::Table;

/// The TABLES section: a list of TABLE ... ENDTAB blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TablesSection {
    /// The tables in file order
    pub tables: Vec<Table>,
}

impl TablesSection {
    /// Create an empty section.
    pub fn new() -> Self {
        TablesSection { tables: Vec::new() }
    }

    /// Find a table by kind name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// Read tables through ENDSEC.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        loop {
            let group_code = input.read_group_code()?;
            if group_code != 0 {
                return Err(DxfError::Parse(format!(
                    "expected TABLE, got group code {} at {}",
                    group_code,
                    input.position_string()
                )));
            }
            let name = input.read_string()?;
            match name.as_str() {
                "ENDSEC" => return Ok(()),
                "TABLE" => {
                    let mut table = Table::new();
                    table.read(input)?;
                    self.tables.push(table);
                }
                other => {
                    return Err(DxfError::Parse(format!(
                        "unexpected {} in TABLES section at {}",
                        other,
                        input.position_string()
                    )));
                }
            }
        }
    }

    pub(crate) fn write_body(&self, output: &mut Output<'_>) -> Result<()> {
        for table in &self.tables {
            table.write(output)?;
        }
        Ok(())
    }

    pub(crate) fn count_body(&self) -> usize {
        self.tables.iter().map(|t| t.count_records()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_tables() {
        let data = "  0\nTABLE\n  2\nLAYER\n 70\n     1\n  0\nLAYER\n  2\nWALLS\n 62\n     3\n 70\n     0\n  0\nENDTAB\n  0\nENDSEC\n";
        let mut input = Input::new(Cursor::new(data.as_bytes().to_vec())).unwrap();
        let mut section = TablesSection::new();
        section.read(&mut input).unwrap();
        assert_eq!(section.tables.len(), 1);
        assert!(section.table("LAYER").is_some());
        assert!(section.table("VPORT").is_none());
    }
}
