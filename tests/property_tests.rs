//! Property tests: the group-code kind table, record round-trips,
//! handle monotonicity.

use dime::{group_code_kind, Handle, Input, Model, Output, Record, Value, ValueKind};
use proptest::prelude::*;
use std::io::Cursor;

/// Independent statement of the kind rules, used as an oracle against
/// the table.
fn kind_oracle(code: i32) -> ValueKind {
    match code {
        c if c < 0 => ValueKind::Text,
        0..=9 => ValueKind::Text,
        10..=59 => ValueKind::Double,
        60..=79 => ValueKind::Int16,
        90..=99 => ValueKind::Int32,
        100..=139 => ValueKind::Text,
        140..=147 => ValueKind::Double,
        170..=178 => ValueKind::Int16,
        210 | 220 | 230 => ValueKind::Double,
        270..=289 => ValueKind::Int8,
        300..=309 => ValueKind::Text,
        310..=369 => ValueKind::Hex,
        999 => ValueKind::Text,
        1000..=1009 => ValueKind::Text,
        1010..=1059 => ValueKind::Text,
        1060..=1070 => ValueKind::Int16,
        1071 => ValueKind::Int32,
        _ => ValueKind::Text,
    }
}

/// A value matching the kind of a group code, with content that
/// survives the ASCII line discipline.
fn value_for_code(code: i32) -> BoxedStrategy<Value> {
    match group_code_kind(code) {
        ValueKind::Int8 => any::<i8>().prop_map(Value::Int8).boxed(),
        ValueKind::Int16 => any::<i16>().prop_map(Value::Int16).boxed(),
        ValueKind::Int32 => any::<i32>().prop_map(Value::Int32).boxed(),
        ValueKind::Float => (-1.0e30f32..1.0e30).prop_map(Value::Float).boxed(),
        ValueKind::Double => (-1.0e200f64..1.0e200).prop_map(Value::Double).boxed(),
        ValueKind::Text => "[A-Za-z0-9_.:-]{0,24}".prop_map(Value::Text).boxed(),
        ValueKind::Hex => "[0-9a-fA-F]{1,12}".prop_map(Value::Hex).boxed(),
    }
}

/// A group code (comments excluded) paired with a matching value.
fn code_and_value() -> impl Strategy<Value = (i32, Value)> {
    (1i32..1072)
        .prop_filter("comments are consumed transparently", |c| *c != 999)
        .prop_flat_map(|code| value_for_code(code).prop_map(move |v| (code, v)))
}

proptest! {
    /// The kind table agrees with the rule list for every covered
    /// code, and falls back to Text outside it.
    #[test]
    fn prop_kind_table_total(code in -10i32..1100) {
        prop_assert_eq!(group_code_kind(code), kind_oracle(code));
    }

    /// Writing a record and reading it back through the lexer
    /// reconstructs an equal record (the double format round-trips
    /// exactly).
    #[test]
    fn prop_record_roundtrip((code, value) in code_and_value()) {
        let record = Record::new(code, value);

        let mut buf = Vec::new();
        {
            let mut out = Output::new(&mut buf);
            record.write(&mut out).unwrap();
        }
        let mut input = Input::new(Cursor::new(buf)).unwrap();
        let read_code = input.read_group_code().unwrap();
        prop_assert_eq!(read_code, code);
        let read_back = Record::read_value(&mut input, read_code).unwrap();
        prop_assert_eq!(&record, &read_back);
    }

    /// Unique handles are strictly greater than everything registered
    /// or issued before, in any interleaving.
    #[test]
    fn prop_handle_monotonicity(ops in prop::collection::vec(prop_oneof![
        (1u64..0xFFFF_FFFF).prop_map(Some),
        Just(None::<u64>),
    ], 1..64)) {
        let mut model = Model::new();
        let mut seen_max = 0u64;
        for op in ops {
            match op {
                Some(h) => {
                    model.register_handle(Handle::new(h));
                    seen_max = seen_max.max(h);
                }
                None => {
                    let issued = model.get_unique_handle().value();
                    prop_assert!(issued > seen_max);
                    seen_max = issued;
                }
            }
        }
    }
}

/// A few pinned cases on top of the property, one per value kind.
#[test]
fn test_record_roundtrip_examples() {
    let cases = vec![
        Record::new(10, Value::Double(1.5)),
        Record::new(62, Value::Int16(-3)),
        Record::new(90, Value::Int32(1 << 20)),
        Record::new(280, Value::Int8(7)),
        Record::new(330, Value::Hex("1aF".into())),
        Record::new(1, Value::Text("primary text".into())),
        Record::new(1071, Value::Int32(-1)),
    ];
    for record in cases {
        let mut buf = Vec::new();
        {
            let mut out = Output::new(&mut buf);
            record.write(&mut out).unwrap();
        }
        let mut input = Input::new(Cursor::new(buf)).unwrap();
        let code = input.read_group_code().unwrap();
        let read_back = Record::read_value(&mut input, code).unwrap();
        assert_eq!(record, read_back);
    }
}
