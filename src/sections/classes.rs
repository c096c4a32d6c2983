//! CLASSES section

use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use crate::record::Record;
use crate::record_holder::RecordHolder;

/// A CLASS declaration; records retained verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DxfClass {
    records: Vec<Record>,
}

impl DxfClass {
    /// Create an empty class declaration.
    pub fn new() -> Self {
        DxfClass {
            records: Vec::new(),
        }
    }

    /// The declared class name (record 1), when present.
    pub fn class_name(&self) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.group_code == 1)
            .and_then(|r| r.value.as_str())
    }
}

impl RecordHolder for DxfClass {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }
}

/// The CLASSES section: a list of CLASS declarations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassesSection {
    /// The class declarations in file order
    pub classes: Vec<DxfClass>,
}

impl ClassesSection {
    /// Create an empty section.
    pub fn new() -> Self {
        ClassesSection {
            classes: Vec::new(),
        }
    }

    /// Read CLASS declarations through ENDSEC.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        loop {
            let group_code = input.read_group_code()?;
            if group_code != 0 {
                return Err(DxfError::Parse(format!(
                    "expected CLASS, got group code {} at {}",
                    group_code,
                    input.position_string()
                )));
            }
            let name = input.read_string()?;
            match name.as_str() {
                "ENDSEC" => return Ok(()),
                "CLASS" => {
                    let mut class = DxfClass::new();
                    class.read_records(input)?;
                    self.classes.push(class);
                }
                other => {
                    return Err(DxfError::Parse(format!(
                        "unexpected {} in CLASSES section at {}",
                        other,
                        input.position_string()
                    )));
                }
            }
        }
    }

    pub(crate) fn write_body(&self, output: &mut Output<'_>) -> Result<()> {
        for class in &self.classes {
            output.write_string(0, "CLASS")?;
            class.write_retained(output)?;
        }
        Ok(())
    }

    pub(crate) fn count_body(&self) -> usize {
        self.classes
            .iter()
            .map(|c| 1 + c.count_retained())
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_classes() {
        let data = "  0\nCLASS\n  1\nACDBDICTIONARYWDFLT\n  2\nAcDbDictionaryWithDefault\n  0\nCLASS\n  1\nDICTIONARYVAR\n  0\nENDSEC\n";
        let mut input = Input::new(Cursor::new(data.as_bytes().to_vec())).unwrap();
        let mut section = ClassesSection::new();
        section.read(&mut input).unwrap();
        assert_eq!(section.classes.len(), 2);
        assert_eq!(section.classes[0].class_name(), Some("ACDBDICTIONARYWDFLT"));
    }
}
