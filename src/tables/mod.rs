//! Symbol tables
//!
//! A TABLE block carries a named kind (LAYER, LTYPE, STYLE, ...) and an
//! ordered list of entries of that kind. LAYER entries are decoded;
//! every other kind falls back to a raw record holder.

use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;

pub mod layer_table;
pub mod unknown_table;

pub use layer_table::LayerTableEntry;
pub use unknown_table::UnknownTableEntry;

/// A polymorphic table entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEntry {
    /// A LAYER table entry
    Layer(LayerTableEntry),
    /// Any other entry kind, records retained verbatim
    Unknown(UnknownTableEntry),
}

impl TableEntry {
    /// Create an entry from its kind name.
    pub fn create(kind: &str) -> TableEntry {
        match kind {
            "LAYER" => TableEntry::Layer(LayerTableEntry::new()),
            _ => TableEntry::Unknown(UnknownTableEntry::new(kind)),
        }
    }

    /// The entry kind name (the value of the leading 0 record).
    pub fn kind(&self) -> &str {
        match self {
            TableEntry::Layer(_) => "LAYER",
            TableEntry::Unknown(entry) => entry.kind(),
        }
    }

    fn holder(&self) -> &dyn RecordHolder {
        match self {
            TableEntry::Layer(entry) => entry,
            TableEntry::Unknown(entry) => entry,
        }
    }

    fn holder_mut(&mut self) -> &mut dyn RecordHolder {
        match self {
            TableEntry::Layer(entry) => entry,
            TableEntry::Unknown(entry) => entry,
        }
    }

    /// Read the entry's record set.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        self.holder_mut().read_records(input)
    }

    /// Serialize the entry.
    pub fn write(&self, output: &mut Output<'_>) -> Result<()> {
        output.write_string(0, self.kind())?;
        match self {
            TableEntry::Layer(entry) => entry.write_fields(output)?,
            TableEntry::Unknown(_) => {}
        }
        self.holder().write_retained(output)
    }

    /// Exact number of records `write` emits.
    pub fn count_records(&self) -> usize {
        let fields = match self {
            TableEntry::Layer(entry) => entry.count_fields(),
            TableEntry::Unknown(_) => 0,
        };
        1 + fields + self.holder().count_retained()
    }
}

/// A TABLE ... ENDTAB block.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// The table kind (code 2 after 0/TABLE): LAYER, LTYPE, ...
    name: String,
    /// Maximum-entry hint (code 70); informational only
    pub max_entries: Option<i16>,
    /// The entries in order
    pub entries: Vec<TableEntry>,
    records: Vec<Record>,
}

impl Table {
    /// Create an empty, unnamed table.
    pub fn new() -> Self {
        Table {
            name: String::new(),
            max_entries: None,
            entries: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Create an empty table of a kind.
    pub fn named(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            ..Self::new()
        }
    }

    /// The table kind name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the table header records, then the entries through ENDTAB.
    pub fn read(&mut self, input: &mut Input) -> Result<()> {
        self.read_records(input)?;
        loop {
            let group_code = input.read_group_code()?;
            if group_code != 0 {
                return Err(DxfError::Parse(format!(
                    "expected table entry, got group code {} at {}",
                    group_code,
                    input.position_string()
                )));
            }
            let kind = input.read_string()?;
            if kind == "ENDTAB" {
                return Ok(());
            }
            let mut entry = TableEntry::create(&kind);
            entry.read(input)?;
            self.entries.push(entry);
        }
    }

    /// Serialize the table as 0/TABLE ... 0/ENDTAB.
    pub fn write(&self, output: &mut Output<'_>) -> Result<()> {
        output.write_string(0, "TABLE")?;
        output.write_string(2, &self.name)?;
        self.write_retained(output)?;
        if let Some(max_entries) = self.max_entries {
            output.write_i16(70, max_entries)?;
        }
        for entry in &self.entries {
            entry.write(output)?;
        }
        output.write_string(0, "ENDTAB")
    }

    /// Exact number of records `write` emits.
    pub fn count_records(&self) -> usize {
        2 + self.count_retained()
            + usize::from(self.max_entries.is_some())
            + self.entries.iter().map(|e| e.count_records()).sum::<usize>()
            + 1
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Table {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn handle_record(&mut self, record: &Record) -> bool {
        match record.group_code {
            2 => {
                if let Some(s) = record.value.as_str() {
                    self.name = s.to_string();
                    return true;
                }
                false
            }
            70 => {
                if let Some(v) = record.value.as_int() {
                    self.max_entries = Some(v as i16);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        match group_code {
            2 => Some(Value::Text(self.name.clone())),
            70 => self.max_entries.map(Value::Int16),
            _ => None,
        }
    }
}
