//! LAYER table entry

use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;

/// A LAYER table entry: name, color, flags; everything else retained.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerTableEntry {
    name: String,
    color_number: i16,
    flags: i16,
    records: Vec<Record>,
}

impl LayerTableEntry {
    /// Create an empty entry (color 7, no flags).
    pub fn new() -> Self {
        LayerTableEntry {
            name: String::new(),
            color_number: 7,
            flags: 0,
            records: Vec::new(),
        }
    }

    /// The layer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the layer name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The layer color number.
    pub fn color_number(&self) -> i16 {
        self.color_number
    }

    /// Set the layer color number.
    pub fn set_color_number(&mut self, color_number: i16) {
        self.color_number = color_number;
    }

    /// The layer flags (code 70).
    pub fn flags(&self) -> i16 {
        self.flags
    }

    /// Whether the layer is frozen (flag bit 1).
    pub fn is_frozen(&self) -> bool {
        self.flags & 1 != 0
    }

    /// Whether the layer is locked (flag bit 4).
    pub fn is_locked(&self) -> bool {
        self.flags & 4 != 0
    }

    pub(crate) fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        output.write_string(2, &self.name)?;
        output.write_i16(62, self.color_number)?;
        output.write_i16(70, self.flags)
    }

    pub(crate) fn count_fields(&self) -> usize {
        3
    }
}

impl Default for LayerTableEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for LayerTableEntry {
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
            62 => {
                if let Some(v) = record.value.as_int() {
                    self.color_number = v as i16;
                    return true;
                }
                false
            }
            70 => {
                if let Some(v) = record.value.as_int() {
                    self.flags = v as i16;
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
            62 => Some(Value::Int16(self.color_number)),
            70 => Some(Value::Int16(self.flags)),
            _ => None,
        }
    }
}
