//! Fallback section for unrecognized names
//!
//! The body — including any embedded 0-coded records — is retained raw
//! through ENDSEC and echoed unchanged.

use crate::error::Result;
use crate::io::{Input, Output};
use crate::record::{Record, Value};

/// A section with an unrecognized name; all records retained.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownSection {
    name: String,
    records: Vec<Record>,
}

impl UnknownSection {
    /// Create an empty unknown section with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        UnknownSection {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// The section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw record list.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Read raw records through ENDSEC.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        loop {
            let group_code = input.read_group_code()?;
            if group_code == 0 {
                let name = input.read_string()?;
                if name == "ENDSEC" {
                    return Ok(());
                }
                self.records.push(Record::new(0, Value::Text(name)));
            } else {
                self.records.push(Record::read_value(input, group_code)?);
            }
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_raw_body_with_embedded_separators() {
        let data = "  0\nACDSRECORD\n 90\n     1\n  0\nACDSRECORD\n 90\n     2\n  0\nENDSEC\n";
        let mut input = Input::new(Cursor::new(data.as_bytes().to_vec())).unwrap();
        let mut section = UnknownSection::new("ACDSDATA");
        section.read(&mut input).unwrap();
        assert_eq!(section.records().len(), 4);
        assert_eq!(section.records()[0], Record::new(0, Value::Text("ACDSRECORD".into())));
        assert_eq!(section.records()[3], Record::new(90, Value::Int32(2)));
    }
}
