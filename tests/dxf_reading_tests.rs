//! Integration tests for DXF reading

mod common;

use common::{parse, parse_bytes};
use dime::record_holder::RecordHolder;
use dime::Entity;
use dime::{DxfError, EntityType, Input, Model, Record, Value};
use std::io::Cursor;

/// A minimal file parses to one empty ENTITIES section.
#[test]
fn test_minimal_file() {
    let model = parse("  0\nSECTION\n  2\nENTITIES\n  0\nENDSEC\n  0\nEOF\n");
    let entities = model.entities_section().expect("entities section");
    assert!(entities.entities.is_empty());
    // Four code/value pairs: 0/SECTION, 2/ENTITIES, 0/ENDSEC, 0/EOF
    assert_eq!(model.count_records(), 4);
}

/// Unpadded group codes parse the same as column-aligned ones.
#[test]
fn test_unpadded_group_codes() {
    let model = parse("0\nSECTION\n2\nENTITIES\n0\nENDSEC\n0\nEOF\n");
    assert_eq!(model.sections().len(), 1);
}

/// A LINE entity decodes its endpoints, layer and color.
#[test]
fn test_single_line() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nLINE\n  8\nL1\n 62\n     3\n",
        " 10\n0.0\n 20\n0.0\n 30\n0.0\n",
        " 11\n10.0\n 21\n5.0\n 31\n2.0\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let entities = &model.entities_section().unwrap().entities;
    assert_eq!(entities.len(), 1);
    let line = match &entities[0] {
        EntityType::Line(line) => line,
        other => panic!("expected LINE, got {}", other.entity_name()),
    };
    assert_eq!(line.start, dime::Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(line.end, dime::Vector3::new(10.0, 5.0, 2.0));
    assert_eq!(line.common.color_number(), 3);
    assert_eq!(line.common.layer().name(), "L1");

    // The auto-created layer adopted the entity's explicit color
    let layer = model.get_layer("L1").expect("layer L1");
    assert_eq!(layer.color_number(), 3);
}

/// An entity with an unrecognized name retains its records in order
/// and echoes them verbatim.
#[test]
fn test_unknown_entity_preserved() {
    let mut model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nFOOBAR\n 10\n1.5\n 20\n2.5\n 99\n     7\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let entities = &model.entities_section().unwrap().entities;
    let unknown = match &entities[0] {
        EntityType::Unknown(unknown) => unknown,
        other => panic!("expected unknown entity, got {}", other.entity_name()),
    };
    assert_eq!(unknown.entity_name(), "FOOBAR");
    assert_eq!(
        unknown.retained_records(),
        &[
            Record::new(10, Value::Double(1.5)),
            Record::new(20, Value::Double(2.5)),
            Record::new(99, Value::Int32(7)),
        ]
    );

    let text = common::write_to_string(&mut model);
    assert!(text.contains("  0\nFOOBAR\n 10\n1.5\n 20\n2.5\n 99\n     7\n"));
}

/// An unrecognized section keeps its raw body through ENDSEC.
#[test]
fn test_unknown_section_preserved() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nACDSDATA\n",
        " 90\n     2\n  0\nACDSRECORD\n 90\n     1\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    match &model.sections()[0] {
        dime::Section::Unknown(section) => {
            assert_eq!(section.name(), "ACDSDATA");
            assert_eq!(section.records().len(), 4);
        }
        other => panic!("expected unknown section, got {}", other.name()),
    }
}

/// Comments ahead of the first section are preserved; comments inside
/// record sets are tolerated.
#[test]
fn test_comments() {
    let model = parse(concat!(
        "999\ngenerated for a reader test\n",
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nPOINT\n999\nmid-entity comment\n 10\n1.0\n 20\n2.0\n 30\n0.0\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    assert_eq!(model.header_comments().len(), 1);
    assert_eq!(
        model.header_comments()[0],
        Record::new(999, Value::Text("generated for a reader test".into()))
    );
    let entities = &model.entities_section().unwrap().entities;
    assert_eq!(entities.len(), 1);
}

/// The binary sentinel switches the lexer to the binary dialect; a
/// whole model parses from 8-bit binary records.
#[test]
fn test_binary_model() {
    let mut data = Vec::new();
    data.extend_from_slice(b"AutoCAD Binary DXF");
    data.extend_from_slice(&[b'\r', b'\n', 0x1a, 0x00]);
    for (code, value) in [
        (0u8, "SECTION"),
        (2, "ENTITIES"),
        (0, "POINT"),
    ] {
        data.push(code);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
    }
    // 10/20/30 as little-endian doubles
    for (code, value) in [(10u8, 1.0f64), (20, 2.0), (30, 3.0)] {
        data.push(code);
        data.extend_from_slice(&value.to_le_bytes());
    }
    for (code, value) in [(0u8, "ENDSEC"), (0, "EOF")] {
        data.push(code);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
    }

    let model = parse_bytes(data);
    let entities = &model.entities_section().unwrap().entities;
    match &entities[0] {
        EntityType::Point(point) => {
            assert_eq!(point.coords, dime::Vector3::new(1.0, 2.0, 3.0));
        }
        other => panic!("expected POINT, got {}", other.entity_name()),
    }
}

/// Any prefix other than the exact sentinel reads as ASCII from
/// offset 0.
#[test]
fn test_sentinel_prefix_must_match_exactly() {
    let input = Input::new(Cursor::new(
        "  0\nSECTION\n  2\nENTITIES\n  0\nENDSEC\n  0\nEOF\n"
            .as_bytes()
            .to_vec(),
    ))
    .unwrap();
    assert!(!input.is_binary());
}

/// Truncated input fails with a truncation error and leaves the model
/// empty.
#[test]
fn test_truncated_file() {
    let mut input = Input::new(Cursor::new(
        "  0\nSECTION\n  2\nENTITIES\n  0\nLINE\n 10\n".as_bytes().to_vec(),
    ))
    .unwrap();
    let mut model = Model::new();
    let err = model.read(&mut input).unwrap_err();
    assert!(matches!(err, DxfError::Truncated(_)));
    assert!(model.sections().is_empty());
}

/// A malformed numeric value fails the read.
#[test]
fn test_malformed_numeric() {
    let mut input = Input::new(Cursor::new(
        "  0\nSECTION\n  2\nENTITIES\n  0\nLINE\n 10\nnot-a-number\n  0\nENDSEC\n  0\nEOF\n"
            .as_bytes()
            .to_vec(),
    ))
    .unwrap();
    let mut model = Model::new();
    let err = model.read(&mut input).unwrap_err();
    assert!(matches!(err, DxfError::Parse(_)));
}

/// An unterminated section fails instead of silently succeeding.
#[test]
fn test_unterminated_section() {
    let mut input = Input::new(Cursor::new(
        "  0\nSECTION\n  2\nENTITIES\n  0\nLINE\n 10\n1.0\n".as_bytes().to_vec(),
    ))
    .unwrap();
    let mut model = Model::new();
    assert!(model.read(&mut input).is_err());
}

/// A progress callback returning false aborts the read.
#[test]
fn test_progress_abort() {
    let mut body = String::from("  0\nSECTION\n  2\nENTITIES\n");
    for i in 0..200 {
        body.push_str(&format!(
            "  0\nPOINT\n 10\n{}.0\n 20\n0.0\n 30\n0.0\n",
            i
        ));
    }
    body.push_str("  0\nENDSEC\n  0\nEOF\n");

    let mut input = Input::new(Cursor::new(body.into_bytes())).unwrap();
    input.set_progress_callback(|_| false);
    let mut model = Model::new();
    let err = model.read(&mut input).unwrap_err();
    assert!(matches!(err, DxfError::Aborted));
    assert!(input.aborted());
}
