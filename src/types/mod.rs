//! Core value types shared across the library

pub mod handle;
pub mod matrix;
pub mod vector;
pub mod version;

pub use handle::Handle;
pub use matrix::Matrix4;
pub use vector::{Vector2, Vector3};
pub use version::DxfVersion;
