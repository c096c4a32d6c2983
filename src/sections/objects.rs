//! OBJECTS section

use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use crate::record::Record;
use crate::record_holder::RecordHolder;

/// A non-graphical object (DICTIONARY, LAYOUT, ...); records retained
/// verbatim under the object's name.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfObject {
    name: String,
    records: Vec<Record>,
}

impl DxfObject {
    /// Create an empty object with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        DxfObject {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// The object name (the value of the leading 0 record).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl RecordHolder for DxfObject {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }
}

/// The OBJECTS section: a flat list of named objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectsSection {
    /// The objects in file order
    pub objects: Vec<DxfObject>,
}

impl ObjectsSection {
    /// Create an empty section.
    pub fn new() -> Self {
        ObjectsSection {
            objects: Vec::new(),
        }
    }

    /// Read objects through ENDSEC.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        loop {
            let group_code = input.read_group_code()?;
            if group_code != 0 {
                return Err(DxfError::Parse(format!(
                    "expected object, got group code {} at {}",
                    group_code,
                    input.position_string()
                )));
            }
            let name = input.read_string()?;
            if name == "ENDSEC" {
                return Ok(());
            }
            let mut object = DxfObject::new(&name);
            object.read_records(input)?;
            self.objects.push(object);
        }
    }

    pub(crate) fn write_body(&self, output: &mut Output<'_>) -> Result<()> {
        for object in &self.objects {
            output.write_string(0, object.name())?;
            object.write_retained(output)?;
        }
        Ok(())
    }

    pub(crate) fn count_body(&self) -> usize {
        self.objects
            .iter()
            .map(|o| 1 + o.count_retained())
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_objects() {
        let data = "  0\nDICTIONARY\n  5\nC\n  0\nLAYOUT\n  1\nModel\n  0\nENDSEC\n";
        let mut input = Input::new(Cursor::new(data.as_bytes().to_vec())).unwrap();
        let mut section = ObjectsSection::new();
        section.read(&mut input).unwrap();
        assert_eq!(section.objects.len(), 2);
        assert_eq!(section.objects[0].name(), "DICTIONARY");
        assert_eq!(section.objects[1].name(), "LAYOUT");
        // The dictionary handle raised the high-water mark
        // (group code 5 registers handles wherever it appears).
    }
}
