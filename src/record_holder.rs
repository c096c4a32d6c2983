//! The record-holder protocol
//!
//! Every domain object that owns records (entities, table entries,
//! classes, sections) reads them through the same loop: records are
//! offered to the object one by one, and whatever the object does not
//! interpret is retained verbatim so it round-trips on write.

use crate::error::{DxfError, Result};
use crate::io::{Input, Output};
use crate::record::{Record, Value};

/// Objects that own a list of group-code records.
///
/// Implementors provide storage for retained records plus the
/// [`handle_record`](RecordHolder::handle_record) hook; the read loop,
/// the write-through of retained records, and the generic get/set
/// operations are provided.
pub trait RecordHolder {
    /// Records the object chose not to interpret, in input order.
    fn retained_records(&self) -> &[Record];

    /// Mutable access to the retained records.
    fn retained_records_mut(&mut self) -> &mut Vec<Record>;

    /// Offer a record to the object. Return `true` when the record was
    /// consumed and stored in a typed field; `false` stores it in the
    /// retained list.
    fn handle_record(&mut self, record: &Record) -> bool {
        let _ = record;
        false
    }

    /// Typed fields exposed back through the generic record interface.
    ///
    /// Implementors that consume records in [`handle_record`] should
    /// report those values here so `get_record` stays symmetric with
    /// `set_record`.
    fn field_record(&self, group_code: i32) -> Option<Value> {
        let _ = group_code;
        None
    }

    /// Records the object serializes itself; the base suppresses them
    /// when echoing the retained list.
    fn should_write_record(&self, group_code: i32) -> bool {
        let _ = group_code;
        true
    }

    /// Group codes whose generic setter is forbidden because a typed
    /// setter exists (layer on entities, block name on INSERT).
    fn reserved_record(&self, group_code: i32) -> bool {
        let _ = group_code;
        false
    }

    /// Read records until the next separator (group code 0), offering
    /// each to [`handle_record`]. The separator is pushed back for the
    /// caller.
    fn read_records(&mut self, input: &mut Input) -> Result<()> {
        loop {
            let group_code = input.read_group_code()?;
            if group_code == 0 {
                input.put_back_group_code(group_code);
                return Ok(());
            }
            let record = Record::read_value(input, group_code)?;
            if !self.handle_record(&record) {
                self.retained_records_mut().push(record);
            }
        }
    }

    /// Write the retained records, in order, filtered through
    /// [`should_write_record`].
    fn write_retained(&self, output: &mut Output<'_>) -> Result<()> {
        for record in self.retained_records() {
            if self.should_write_record(record.group_code) {
                record.write(output)?;
            }
        }
        Ok(())
    }

    /// Number of retained records the serializer will emit.
    fn count_retained(&self) -> usize {
        self.retained_records()
            .iter()
            .filter(|r| self.should_write_record(r.group_code))
            .count()
    }

    /// Get the value of the record with `group_code`. Typed fields are
    /// consulted first, then the retained list.
    fn get_record(&self, group_code: i32) -> Option<Value> {
        self.get_record_indexed(group_code, 0)
    }

    /// Like [`get_record`](RecordHolder::get_record), but returns the
    /// `index`'th record with the same group code.
    fn get_record_indexed(&self, group_code: i32, index: usize) -> Option<Value> {
        if index == 0 {
            if let Some(value) = self.field_record(group_code) {
                return Some(value);
            }
        }
        self.retained_records()
            .iter()
            .filter(|r| r.group_code == group_code)
            .nth(index)
            .map(|r| r.value.clone())
    }

    /// Set the value of the record with `group_code`, overwriting an
    /// existing retained record or appending a new one. Values the
    /// object interprets go through [`handle_record`]; reserved codes
    /// fail with [`DxfError::IllegalSetter`].
    fn set_record(&mut self, group_code: i32, value: Value) -> Result<()> {
        self.set_record_indexed(group_code, value, 0)
    }

    /// Like [`set_record`](RecordHolder::set_record), but addresses the
    /// `index`'th record with the same group code.
    fn set_record_indexed(&mut self, group_code: i32, value: Value, index: usize) -> Result<()> {
        if self.reserved_record(group_code) {
            return Err(DxfError::IllegalSetter(group_code));
        }
        let record = Record::new(group_code, value);
        if self.handle_record(&record) {
            return Ok(());
        }
        let position = self
            .retained_records()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.group_code == group_code)
            .map(|(i, _)| i)
            .nth(index);
        match position {
            Some(i) => self.retained_records_mut()[i].value = record.value,
            None => self.retained_records_mut().push(record),
        }
        Ok(())
    }
}
