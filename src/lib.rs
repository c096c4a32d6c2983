//! # dime
//!
//! A pure Rust library for reading, editing and writing CAD drawings in
//! DXF format.
//!
//! The model preserves every group-code record faithfully — known and
//! unknown — so a drawing survives a read/modify/write cycle with the
//! fidelity downstream CAD tooling expects.
//!
//! ## Features
//!
//! - Read ASCII DXF and both binary sub-dialects (8-bit and 16-bit
//!   group codes); write ASCII
//! - Typed entities (LINE, ARC, CIRCLE, POLYLINE, LWPOLYLINE, INSERT,
//!   TEXT, MTEXT, SPLINE, ...) with verbatim retention of everything
//!   unrecognized
//! - Block/insert cross-reference resolution and transform-carrying
//!   entity traversal
//! - Layer registry, unique-handle issuance, `$HANDSEED` maintenance
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dime::{Input, Model, Output};
//!
//! // Read a DXF file
//! let mut model = Model::from_file("drawing.dxf")?;
//!
//! // Walk the entities
//! model.traverse_entities(false, true, false, |state, entity| {
//!     println!("{} on layer {}", entity.entity_name(), entity.common().layer().name());
//!     true
//! });
//!
//! // Write it back
//! let mut output = Output::to_file("out.dxf")?;
//! model.write(&mut output)?;
//! # Ok::<(), dime::DxfError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`Input`] / [`Output`] — the stream lexer and serializer
//! - [`Record`] — one (group code, typed value) pair; the group-code
//!   type map lives in [`record`]
//! - [`RecordHolder`] — the read-loop protocol shared by everything
//!   that owns records
//! - [`entities`] — the polymorphic entity set
//! - [`Model`] — sections, registries, fix-up and traversal

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod entities;
pub mod error;
pub mod io;
pub mod layer;
pub mod model;
pub mod notification;
pub mod record;
pub mod record_holder;
pub mod sections;
pub mod state;
pub mod tables;
pub mod types;

// Re-export commonly used types
pub use error::{DxfError, Result};
pub use io::{Input, Output};
pub use layer::{Layer, LayerRef};
pub use model::Model;
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use record::{group_code_kind, Record, Value, ValueKind};
pub use record_holder::RecordHolder;
pub use state::{State, StateFlags};
pub use types::{DxfVersion, Handle, Matrix4, Vector2, Vector3};

// Re-export entity types
pub use entities::{
    Arc, Block, BlockRef, Circle, Ellipse, Entity, EntityType, Face3D, Geometry, GeometryKind,
    Insert, Line, LwPolyline, MText, Point, Polyline, Solid, Spline, TessellationParams, Text,
    Trace, UnknownEntity, Vertex,
};

// Re-export section and table types
pub use sections::Section;
pub use tables::{Table, TableEntry};

/// Library version from the package manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The library's version banner.
pub fn version_string() -> &'static str {
    "DIME v0.9 biscuit"
}

/// The library's (major, minor) version numbers.
pub fn version() -> (i32, i32) {
    (0, 9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(version_string(), "DIME v0.9 biscuit");
        assert_eq!(version(), (0, 9));
    }

    #[test]
    fn test_model_creation() {
        let model = Model::new();
        assert!(model.sections().is_empty());
        assert_eq!(model.largest_handle(), 0);
    }
}
