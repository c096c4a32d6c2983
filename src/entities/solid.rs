//! Solid entity

use super::face3d::{corner_field_record, handle_corner_record, write_corners};
use super::{Entity, EntityCommon, Extrusion, Geometry, GeometryKind, TessellationParams};
use crate::error::Result;
use crate::io::Output;
use crate::record::{Record, Value};
use crate::record_holder::RecordHolder;
use crate::types::Vector3;

/// Emit a filled quad with the interchange format's corner quirk: the
/// third and fourth corners are stored swapped relative to the polygon
/// winding.
pub(crate) fn quad_geometry(corners: &[Vector3; 4], geometry: &mut Geometry) -> GeometryKind {
    geometry.vertices.push(corners[0]);
    geometry.vertices.push(corners[1]);
    if corners[2] == corners[3] {
        geometry.vertices.push(corners[2]);
    } else {
        geometry.vertices.push(corners[3]);
        geometry.vertices.push(corners[2]);
    }
    GeometryKind::Polygons
}

/// A filled quadrilateral (SOLID) entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    /// Common entity data
    pub common: EntityCommon,
    /// Corner points (codes 10..13, 20..23, 30..33)
    pub corners: [Vector3; 4],
    /// Thickness and extrusion direction
    pub extrusion: Extrusion,
    records: Vec<Record>,
}

impl Solid {
    /// Create a degenerate solid at the origin.
    pub fn new() -> Self {
        Solid {
            common: EntityCommon::new(),
            corners: [Vector3::ZERO; 4],
            extrusion: Extrusion::new(),
            records: Vec::new(),
        }
    }
}

impl Default for Solid {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHolder for Solid {
    fn retained_records(&self) -> &[Record] {
        &self.records
    }

    fn retained_records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn handle_record(&mut self, record: &Record) -> bool {
        if handle_corner_record(&mut self.corners, record) {
            return true;
        }
        self.extrusion.handle_record(record) || self.common.handle_common_record(record)
    }

    fn field_record(&self, group_code: i32) -> Option<Value> {
        corner_field_record(&self.corners, group_code)
            .or_else(|| self.extrusion.field_record(group_code))
            .or_else(|| self.common.field_record(group_code))
    }

    fn should_write_record(&self, group_code: i32) -> bool {
        !self.common.suppresses(group_code)
    }

    fn reserved_record(&self, group_code: i32) -> bool {
        group_code == 8
    }
}

impl Entity for Solid {
    fn entity_name(&self) -> &str {
        "SOLID"
    }

    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn write(&self, output: &mut Output<'_>) -> Result<()> {
        self.common.pre_write(output, self.entity_name(), &self.records)?;
        write_corners(&self.corners, output)?;
        self.extrusion.write(output)?;
        self.write_retained(output)
    }

    fn count_records(&self) -> usize {
        self.common.count_records(&self.records)
            + 12
            + self.extrusion.count_records()
            + self.count_retained()
    }

    fn extract_geometry(
        &self,
        _params: &TessellationParams,
        geometry: &mut Geometry,
    ) -> GeometryKind {
        geometry.extrusion = self.extrusion.direction;
        geometry.thickness = self.extrusion.thickness;
        quad_geometry(&self.corners, geometry)
    }
}
