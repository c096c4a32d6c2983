//! Shared test utilities for dime integration tests.

#![allow(dead_code)]

use dime::{Input, Model, Output};
use std::io::Cursor;

/// Parse a model from an ASCII DXF string.
pub fn parse(data: &str) -> Model {
    let mut input = Input::new(Cursor::new(data.as_bytes().to_vec())).expect("input");
    let mut model = Model::new();
    model.read(&mut input).expect("model should parse");
    model
}

/// Parse a model from raw bytes (binary dialect tests).
pub fn parse_bytes(data: Vec<u8>) -> Model {
    let mut input = Input::new(Cursor::new(data)).expect("input");
    let mut model = Model::new();
    model.read(&mut input).expect("model should parse");
    model
}

/// Serialize a model to a string, asserting the record-count contract
/// along the way.
pub fn write_to_string(model: &mut Model) -> String {
    let expected = model.count_records();
    let mut buf = Vec::new();
    {
        let mut output = Output::new(&mut buf);
        model.write(&mut output).expect("model should serialize");
        assert_eq!(
            output.written_records(),
            expected,
            "count_records must match the emitted record count"
        );
    }
    String::from_utf8(buf).expect("ascii output")
}

/// Parse, serialize, and re-parse; returns both models for deep
/// comparison. The first model is returned post-write (the write may
/// refresh $HANDSEED).
pub fn roundtrip(data: &str) -> (Model, Model) {
    let mut first = parse(data);
    let text = write_to_string(&mut first);
    let second = parse(&text);
    (first, second)
}

/// A small drawing exercising most entity kinds, used by the
/// round-trip tests and the bench.
pub fn rich_drawing() -> String {
    concat!(
        "999\nsample drawing\n",
        "  0\nSECTION\n  2\nHEADER\n",
        "  9\n$ACADVER\n  1\nAC1015\n",
        "  9\n$HANDSEED\n  5\nFF\n",
        "  0\nENDSEC\n",
        "  0\nSECTION\n  2\nTABLES\n",
        "  0\nTABLE\n  2\nLAYER\n 70\n     1\n",
        "  0\nLAYER\n  2\nWALLS\n 62\n     3\n 70\n     0\n",
        "  0\nENDTAB\n",
        "  0\nENDSEC\n",
        "  0\nSECTION\n  2\nBLOCKS\n",
        "  0\nBLOCK\n  8\nWALLS\n  2\nB1\n 70\n     0\n 10\n1.0\n 20\n2.0\n 30\n3.0\n",
        "  0\nPOINT\n  8\nWALLS\n 10\n0.0\n 20\n0.0\n 30\n0.0\n",
        "  0\nENDBLK\n",
        "  0\nENDSEC\n",
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nLINE\n  5\nA\n  8\nWALLS\n 62\n     3\n",
        " 10\n0.0\n 20\n0.0\n 30\n0.0\n 11\n10.0\n 21\n5.0\n 31\n2.0\n",
        "  0\nCIRCLE\n  5\nB\n  8\nWALLS\n 10\n1.0\n 20\n1.0\n 30\n0.0\n 40\n2.5\n",
        "  0\nARC\n  8\nWALLS\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 40\n1.0\n 50\n0.0\n 51\n90.0\n",
        "  0\nTEXT\n  8\nWALLS\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 40\n2.0\n  1\nhello\n",
        "  0\nLWPOLYLINE\n  8\nWALLS\n 90\n     2\n 70\n     1\n",
        " 10\n0.0\n 20\n0.0\n 10\n4.0\n 20\n0.0\n",
        "  0\nPOLYLINE\n  8\nWALLS\n 66\n     1\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 70\n     1\n",
        "  0\nVERTEX\n  8\nWALLS\n 10\n0.0\n 20\n0.0\n 30\n0.0\n",
        "  0\nVERTEX\n  8\nWALLS\n 10\n1.0\n 20\n0.0\n 30\n0.0\n",
        "  0\nVERTEX\n  8\nWALLS\n 10\n1.0\n 20\n1.0\n 30\n0.0\n",
        "  0\nSEQEND\n",
        "  0\nINSERT\n  2\nB1\n 10\n10.0\n 20\n10.0\n 30\n0.0\n",
        "  0\nFOOBAR\n 10\n1.5\n 20\n2.5\n 99\n     7\n",
        "  0\nENDSEC\n",
        "  0\nSECTION\n  2\nACDSDATA\n 90\n     1\n  0\nENDSEC\n",
        "  0\nEOF\n"
    )
    .to_string()
}
