//! Fallback entity for unrecognized names
//!
//! Unknown entities interpret nothing: the name and every record are
//! retained verbatim and echoed unchanged, so unrecognized content
//! survives a read/write cycle byte-for-record.

use super::{Entity, EntityCommon};
use crate::error::Result;
use crate::io::Output;
use crate::record::Record;
use crate::record_holder::RecordHolder;

/// An entity with an unrecognized name; all records retained.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownEntity {
    /// Common entity data (kept for the non-null layer contract; the
    /// records themselves stay uninterpreted)
    pub common: EntityCommon,
    name: String,
    records: Vec<Record>,
}

impl UnknownEntity {
    /// Create an unknown entity with the given DXF name.
    pub fn new(name: impl Into<String>) -> Self {
        UnknownEntity {
            common: EntityCommon::new(),
            name: name.into(),
            records: Vec::new(),
        }
    }
}

impl RecordHolder for UnknownEntity {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }
}

impl Entity for UnknownEntity {
    fn entity_name(&self) -> &str {
        &self.name
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        output.write_string(0, &self.name)?;
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        1 + self.count_retained()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    #[test]
    fn test_everything_retained() {
        let mut entity = UnknownEntity::new("FOOBAR");
        // Even entity-common codes stay verbatim
        assert!(!entity.handle_record(&Record::new(8, Value::Text("L".into()))));
        entity
            .retained_records_mut()
            .push(Record::new(10, Value::Double(1.5)));
        assert_eq!(entity.retained_records().len(), 1);
        assert_eq!(entity.entity_name(), "FOOBAR");
    }

    #[test]
    fn test_verbatim_echo() {
        let mut entity = UnknownEntity::new("FOOBAR");
        entity
            .retained_records_mut()
            .push(Record::new(10, Value::Double(1.5)));
        entity
            .retained_records_mut()
            .push(Record::new(20, Value::Double(2.5)));
        entity
            .retained_records_mut()
            .push(Record::new(99, Value::Int32(7)));

        let mut buf = Vec::new();
        {
            let mut out = Output::new(&mut buf);
            entity.write(&mut out).unwrap();
            assert_eq!(out.written_records(), entity.count_records());
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "  0\nFOOBAR\n 10\n1.5\n 20\n2.5\n 99\n     7\n");
    }
}
