//! HEADER section
//!
//! The header is an ordered record list where group code 9 marks the
//! start of a variable ($ACADVER, $HANDSEED, ...) and the records up to
//! the next marker are its value.

use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use crate::record::{Record, Value};

/// The HEADER section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderSection {
    records: Vec<Record>,
}

impl HeaderSection {
    /// Create an empty header.
    pub fn new() -> Self {
        HeaderSection {
            records: Vec::new(),
        }
    }

    /// The raw record list.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Read records through ENDSEC.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        loop {
            let group_code = input.read_group_code()?;
            if group_code == 0 {
                let name = input.read_string()?;
                if name == "ENDSEC" {
                    return Ok(());
                }
                return Err(DxfError::Parse(format!(
                    "unexpected {} in HEADER section at {}",
                    name,
                    input.position_string()
                )));
            }
            self.records.push(Record::read_value(input, group_code)?);
        }
    }

    pub(crate) fn write_body(&self, output: &mut Output<'_>) -> Result<()> {
        for record in &self.records {
            record.write(output)?;
        }
        Ok(())
    }

    pub(crate) fn count_body(&self) -> usize {
        self.records.len()
    }

    /// The value records of a header variable: everything between the
    /// 9/`name` marker and the next marker.
    pub fn get_variable(&self, name: &str) -> Option<Vec<Record>> {
        let start = self.variable_start(name)?;
        let mut values = Vec::new();
        for record in &self.records[start..] {
            if record.group_code == 9 {
                break;
            }
            values.push(record.clone());
        }
        Some(values)
    }

    /// Replace the value records of a header variable, or append the
    /// variable when it is missing.
    pub fn set_variable(&mut self, name: &str, values: Vec<Record>) {
        match self.variable_start(name) {
            Some(start) => {
                let end = self.records[start..]
                    .iter()
                    .position(|r| r.group_code == 9)
                    .map(|offset| start + offset)
                    .unwrap_or(self.records.len());
                self.records.splice(start..end, values);
            }
            None => {
                self.records
                    .push(Record::new(9, Value::Text(name.to_string())));
                self.records.extend(values);
            }
        }
    }

    /// Index of the first value record of a variable.
    fn variable_start(&self, name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.group_code == 9 && r.value.as_str() == Some(name))
            .map(|i| i + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header_from(data: &str) -> HeaderSection {
        let mut input = Input::new(Cursor::new(data.as_bytes().to_vec())).unwrap();
        let mut section = HeaderSection::new();
        section.read(&mut input).unwrap();
        section
    }

    #[test]
    fn test_read_variables() {
        let header = header_from(
            "  9\n$ACADVER\n  1\nAC1015\n  9\n$HANDSEED\n  5\nFF\n  0\nENDSEC\n",
        );
        assert_eq!(header.records().len(), 4);
        let acadver = header.get_variable("$ACADVER").unwrap();
        assert_eq!(acadver, vec![Record::new(1, Value::Text("AC1015".into()))]);
        assert!(header.get_variable("$MISSING").is_none());
    }

    #[test]
    fn test_set_variable_replaces() {
        let mut header = header_from(
            "  9\n$HANDSEED\n  5\nFF\n  9\n$INSBASE\n 10\n0.0\n 20\n0.0\n 30\n0.0\n  0\nENDSEC\n",
        );
        header.set_variable("$HANDSEED", vec![Record::new(5, Value::Text("101".into()))]);
        assert_eq!(
            header.get_variable("$HANDSEED").unwrap(),
            vec![Record::new(5, Value::Text("101".into()))]
        );
        // The following variable is untouched
        assert_eq!(header.get_variable("$INSBASE").unwrap().len(), 3);
    }

    #[test]
    fn test_set_variable_appends_when_missing() {
        let mut header = HeaderSection::new();
        header.set_variable("$ACADVER", vec![Record::new(1, Value::Text("AC1009".into()))]);
        assert_eq!(header.records().len(), 2);
        assert!(header.get_variable("$ACADVER").is_some());
    }

    #[test]
    fn test_stray_entity_is_an_error() {
        let mut input = Input::new(Cursor::new(
            "  9\n$X\n  0\nLINE\n".as_bytes().to_vec(),
        ))
        .unwrap();
        let mut section = HeaderSection::new();
        assert!(section.read(&mut input).is_err());
    }
}
