//! Traversal state
//!
//! A traversal through the model carries a running world transform:
//! each INSERT level multiplies its placement onto the parent matrix
//! instead of every callback re-deriving it from scratch.

use crate::types::Matrix4;
use bitflags::bitflags;

bitflags! {
    /// Traversal behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StateFlags: u32 {
        /// Deliver the referenced block's entities for each INSERT
        /// instead of the INSERT itself.
        const EXPLODE_INSERTS = 0x1;
        /// Deliver POLYLINE vertices in addition to the polyline.
        const TRAVERSE_POLYLINE_VERTICES = 0x2;
    }
}

/// The state carried through an entity traversal: the accumulated
/// transform and the traversal flags.
#[derive(Debug, Clone)]
pub struct State {
    matrix: Matrix4,
    flags: StateFlags,
}

impl State {
    /// Create a state with an identity transform.
    pub fn new(flags: StateFlags) -> Self {
        State {
            matrix: Matrix4::identity(),
            flags,
        }
    }

    /// The accumulated transform.
    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    /// The traversal flags.
    pub fn flags(&self) -> StateFlags {
        self.flags
    }

    /// Whether INSERTs deliver their block's entities.
    pub fn explode_inserts(&self) -> bool {
        self.flags.contains(StateFlags::EXPLODE_INSERTS)
    }

    /// Whether POLYLINE vertices are delivered.
    pub fn traverse_polyline_vertices(&self) -> bool {
        self.flags.contains(StateFlags::TRAVERSE_POLYLINE_VERTICES)
    }

    /// A copy of this state with a replacement transform.
    pub fn with_matrix(&self, matrix: Matrix4) -> State {
        State {
            matrix,
            flags: self.flags,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        State::new(StateFlags::empty())
    }
}
