//! Group-code records and the group-code type map
//!
//! Every datum in a DXF stream is a (group code, value) pair. The group
//! code alone determines how the value is encoded, via a fixed table
//! covering codes 0..=1071; codes outside that range decode as strings.

use crate::error::Result;
use crate::io::{Input, Output};
use once_cell::sync::Lazy;

/// The storage kind a group code maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// Single-precision float (kept for API completeness; no group code
    /// maps to it on read — see the 1010..1059 note below)
    Float,
    /// Double-precision float
    Double,
    /// UTF-8 string
    Text,
    /// Hexadecimal string: binary chunks (310..319) and handles
    /// (320..369) share this external kind
    Hex,
}

/// A typed record value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Float(f32),
    Double(f64),
    Text(String),
    Hex(String),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int8(_) => ValueKind::Int8,
            Value::Int16(_) => ValueKind::Int16,
            Value::Int32(_) => ValueKind::Int32,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Text(_) => ValueKind::Text,
            Value::Hex(_) => ValueKind::Hex,
        }
    }

    /// Integer view across all integer widths.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Floating-point view.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// String view (text and hex kinds).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Hex(s) => Some(s),
            _ => None,
        }
    }
}

/// Number of entries in the kind table; codes 0..=1071 are covered.
pub const KIND_TABLE_SIZE: usize = 1072;

static KIND_TABLE: Lazy<[ValueKind; KIND_TABLE_SIZE]> = Lazy::new(build_kind_table);

fn build_kind_table() -> [ValueKind; KIND_TABLE_SIZE] {
    let mut table = [ValueKind::Text; KIND_TABLE_SIZE];
    for code in 0..KIND_TABLE_SIZE as i32 {
        let kind = match code {
            0..=9 => ValueKind::Text,
            10..=59 => ValueKind::Double,
            60..=79 => ValueKind::Int16,
            90..=99 => ValueKind::Int32,
            100..=139 => ValueKind::Text,
            140..=147 => ValueKind::Double,
            170..=178 => ValueKind::Int16,
            210 | 220 | 230 => ValueKind::Double,
            270..=275 => ValueKind::Int8,
            280..=289 => ValueKind::Int8,
            300..=309 => ValueKind::Text,
            310..=319 => ValueKind::Hex,
            320..=369 => ValueKind::Hex,
            999 => ValueKind::Text,
            1000..=1009 => ValueKind::Text,
            // The interchange documentation says single-precision float,
            // but observed files carry values outside f32 range, so
            // these stay strings.
            1010..=1059 => ValueKind::Text,
            1060..=1070 => ValueKind::Int16,
            1071 => ValueKind::Int32,
            _ => ValueKind::Text,
        };
        table[code as usize] = kind;
    }
    table
}

/// Look up the value kind for a group code.
///
/// Total over all of `i32`: codes below 0 or above 1071 decode as
/// strings.
pub fn group_code_kind(group_code: i32) -> ValueKind {
    if (0..KIND_TABLE_SIZE as i32).contains(&group_code) {
        KIND_TABLE[group_code as usize]
    } else {
        ValueKind::Text
    }
}

/// A single (group code, value) record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The DXF group code
    pub group_code: i32,
    /// The typed value
    pub value: Value,
}

impl Record {
    /// Create a new record.
    pub fn new(group_code: i32, value: Value) -> Self {
        Record { group_code, value }
    }

    /// Read the value for `group_code` from the stream, typed per the
    /// kind table.
    ///
    /// Group code 1 preserves leading whitespace in its string value
    /// (the primary text payload of TEXT); group code 5 raises the
    /// input's handle high-water mark as a side effect.
    pub fn read_value(input: &mut Input, group_code: i32) -> Result<Record> {
        let value = match group_code_kind(group_code) {
            ValueKind::Int8 => Value::Int8(input.read_int8()?),
            ValueKind::Int16 => Value::Int16(input.read_int16()?),
            ValueKind::Int32 => Value::Int32(input.read_int32()?),
            ValueKind::Float => Value::Float(input.read_float()?),
            ValueKind::Double => Value::Double(input.read_double()?),
            ValueKind::Text => {
                if group_code == 1 {
                    Value::Text(input.read_string_no_skip()?)
                } else {
                    Value::Text(input.read_string()?)
                }
            }
            ValueKind::Hex => Value::Hex(input.read_string()?),
        };
        // Entity handles travel on code 5 (a string per the table);
        // registering them arms the unique-handle high-water mark.
        if group_code == 5 {
            if let Some(s) = value.as_str() {
                input.register_handle(s);
            }
        }
        Ok(Record::new(group_code, value))
    }

    /// Write this record (group code, then value) to the stream.
    pub fn write(&self, output: &mut Output<'_>) -> Result<()> {
        match &self.value {
            Value::Int8(v) => output.write_i8(self.group_code, *v),
            Value::Int16(v) => output.write_i16(self.group_code, *v),
            Value::Int32(v) => output.write_i32(self.group_code, *v),
            Value::Float(v) => output.write_f32(self.group_code, *v),
            Value::Double(v) => output.write_f64(self.group_code, *v),
            Value::Text(s) => output.write_string(self.group_code, s),
            Value::Hex(s) => output.write_string(self.group_code, s),
        }
    }
}
