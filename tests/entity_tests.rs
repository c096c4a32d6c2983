//! Per-entity integration tests: decode contracts and geometry
//! boundaries.

mod common;

use common::parse;
use dime::{Entity, EntityType, Geometry, GeometryKind, TessellationParams, Vector3};

fn only_entity(model: &dime::Model) -> &EntityType {
    let entities = &model.entities_section().unwrap().entities;
    assert_eq!(entities.len(), 1);
    &entities[0]
}

/// E4: a polyface mesh produces explicit face indices over its
/// coordinate vertices.
#[test]
fn test_polyface_mesh_geometry() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nPOLYLINE\n 66\n     1\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 70\n    64\n",
        "  0\nVERTEX\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 70\n   192\n",
        "  0\nVERTEX\n 10\n1.0\n 20\n0.0\n 30\n0.0\n 70\n   192\n",
        "  0\nVERTEX\n 10\n1.0\n 20\n1.0\n 30\n0.0\n 70\n   192\n",
        "  0\nVERTEX\n 10\n0.0\n 20\n1.0\n 30\n0.0\n 70\n   192\n",
        "  0\nVERTEX\n 70\n   128\n 71\n     1\n 72\n     2\n 73\n     3\n 74\n     4\n",
        "  0\nSEQEND\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let poly = match only_entity(&model) {
        EntityType::Polyline(poly) => poly,
        other => panic!("expected POLYLINE, got {}", other.entity_name()),
    };
    assert_eq!(poly.coord_vertices.len(), 4);
    assert_eq!(poly.index_vertices.len(), 1);

    let mut geometry = Geometry::new();
    let kind = poly.extract_geometry(&TessellationParams::default(), &mut geometry);
    assert_eq!(kind, GeometryKind::Polygons);
    assert_eq!(geometry.vertices.len(), 4);
    assert_eq!(geometry.vertices[0], Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(geometry.vertices[3], Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(geometry.indices, vec![0, 1, 2, 3, -1]);
}

/// Spline-frame vertices (flag 16) go to their own list.
#[test]
fn test_spline_frame_vertex_partition() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nPOLYLINE\n 66\n     1\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 70\n     4\n",
        "  0\nVERTEX\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 70\n    16\n",
        "  0\nVERTEX\n 10\n0.5\n 20\n0.5\n 30\n0.0\n 70\n     8\n",
        "  0\nSEQEND\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let poly = match only_entity(&model) {
        EntityType::Polyline(poly) => poly,
        other => panic!("expected POLYLINE, got {}", other.entity_name()),
    };
    assert_eq!(poly.frame_vertices.len(), 1);
    assert_eq!(poly.coord_vertices.len(), 1);
    assert_eq!(poly.index_vertices.len(), 0);
}

/// Arc sweep wraps when the end angle is below the start angle.
#[test]
fn test_arc_wrapped_sweep() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nARC\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 40\n1.0\n 50\n270.0\n 51\n45.0\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let arc = match only_entity(&model) {
        EntityType::Arc(arc) => arc,
        other => panic!("expected ARC, got {}", other.entity_name()),
    };
    assert_eq!(arc.sweep(), 135.0);
}

/// Coincident start and end angles sweep a full circle. Flagged, not
/// canonical: the original logged a warning and swept a full turn.
#[test]
fn test_arc_coincident_angles_full_turn() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nARC\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 40\n1.0\n 50\n90.0\n 51\n90.0\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let arc = match only_entity(&model) {
        EntityType::Arc(arc) => arc,
        other => panic!("expected ARC, got {}", other.entity_name()),
    };
    assert_eq!(arc.sweep(), 360.0);
}

/// TEXT box width follows height x 0.82 x length x width scale.
#[test]
fn test_text_width_recomputation() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nTEXT\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 40\n2.0\n 41\n0.5\n  1\nabcd\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let text = match only_entity(&model) {
        EntityType::Text(text) => text.clone(),
        other => panic!("expected TEXT, got {}", other.entity_name()),
    };
    assert!((text.width() - 2.0 * 0.82 * 4.0 * 0.5).abs() < 1e-12);

    let mut text = text;
    text.set_text("ab");
    assert!((text.width() - 2.0 * 0.82 * 2.0 * 0.5).abs() < 1e-12);
    text.set_height(4.0);
    assert!((text.width() - 4.0 * 0.82 * 2.0 * 0.5).abs() < 1e-12);
}

/// The primary text value keeps leading whitespace.
#[test]
fn test_text_leading_whitespace_preserved() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nTEXT\n 40\n1.0\n  1\n  indented\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let text = match only_entity(&model) {
        EntityType::Text(text) => text,
        other => panic!("expected TEXT, got {}", other.entity_name()),
    };
    assert_eq!(text.text(), "  indented");
}

/// Circle tessellation: at least 3 segments, override wins.
#[test]
fn test_circle_tessellation_bounds() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nCIRCLE\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 40\n0.001\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let circle = match only_entity(&model) {
        EntityType::Circle(circle) => circle,
        other => panic!("expected CIRCLE, got {}", other.entity_name()),
    };
    // Tiny radius against the default error bound still yields 3+
    assert!(circle.segment_count(&TessellationParams::default()) >= 3);

    let params = TessellationParams {
        segment_override: 64,
        max_chord_error: 0.1,
    };
    assert_eq!(circle.segment_count(&params), 64);
}

/// INSERT attribute sub-entities are read through SEQEND.
#[test]
fn test_insert_attributes() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nINSERT\n  2\nB1\n 66\n     1\n 10\n0.0\n 20\n0.0\n 30\n0.0\n",
        "  0\nATTRIB\n  8\n0\n  1\nvalue\n  2\nTAG\n",
        "  0\nSEQEND\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let insert = match only_entity(&model) {
        EntityType::Insert(insert) => insert,
        other => panic!("expected INSERT, got {}", other.entity_name()),
    };
    assert_eq!(insert.attributes.len(), 1);
    assert_eq!(insert.attributes[0].entity_name(), "ATTRIB");
    assert!(insert.seqend.is_some());
}

/// An LWPOLYLINE decodes interleaved vertex fields into points.
#[test]
fn test_lwpolyline_vertices() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nLWPOLYLINE\n 90\n     3\n 70\n     0\n",
        " 10\n0.0\n 20\n0.0\n 42\n0.5\n",
        " 10\n1.0\n 20\n0.0\n",
        " 10\n1.0\n 20\n1.0\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let poly = match only_entity(&model) {
        EntityType::LwPolyline(poly) => poly,
        other => panic!("expected LWPOLYLINE, got {}", other.entity_name()),
    };
    assert_eq!(poly.vertices.len(), 3);
    assert_eq!(poly.vertices[0].bulge, 0.5);
    assert_eq!(poly.vertices[2].location, dime::Vector2::new(1.0, 1.0));
}

/// A SPLINE decodes knots, control points and fit points.
#[test]
fn test_spline_streams() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\nSPLINE\n 70\n     8\n 71\n     3\n 72\n     8\n 73\n     4\n 74\n     0\n",
        " 40\n0.0\n 40\n0.0\n 40\n0.0\n 40\n0.0\n 40\n1.0\n 40\n1.0\n 40\n1.0\n 40\n1.0\n",
        " 10\n0.0\n 20\n0.0\n 30\n0.0\n",
        " 10\n1.0\n 20\n2.0\n 30\n0.0\n",
        " 10\n2.0\n 20\n2.0\n 30\n0.0\n",
        " 10\n3.0\n 20\n0.0\n 30\n0.0\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let spline = match only_entity(&model) {
        EntityType::Spline(spline) => spline,
        other => panic!("expected SPLINE, got {}", other.entity_name()),
    };
    assert_eq!(spline.degree, 3);
    assert_eq!(spline.knots.len(), 8);
    assert_eq!(spline.control_points.len(), 4);
    assert_eq!(spline.control_points[1], Vector3::new(1.0, 2.0, 0.0));
    assert!(spline.fit_points.is_empty());
}

/// 3DFACE corners decode by their column digit.
#[test]
fn test_face3d_corners() {
    let model = parse(concat!(
        "  0\nSECTION\n  2\nENTITIES\n",
        "  0\n3DFACE\n",
        " 10\n0.0\n 20\n0.0\n 30\n0.0\n",
        " 11\n1.0\n 21\n0.0\n 31\n0.0\n",
        " 12\n1.0\n 22\n1.0\n 32\n0.0\n",
        " 13\n0.0\n 23\n1.0\n 33\n0.0\n",
        " 70\n     5\n",
        "  0\nENDSEC\n  0\nEOF\n"
    ));
    let face = match only_entity(&model) {
        EntityType::Face3D(face) => face,
        other => panic!("expected 3DFACE, got {}", other.entity_name()),
    };
    assert_eq!(face.corners[2], Vector3::new(1.0, 1.0, 0.0));
    assert_eq!(face.flags, 5);
}
