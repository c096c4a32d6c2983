//! DXF stream input and output
//!
//! [`Input`] turns a byte stream into typed group-code records,
//! autodetecting the ASCII dialect and both binary sub-dialects.
//! [`Output`] serializes records back; it always emits ASCII.

mod input;
mod output;

pub use input::Input;
pub use output::{Output, ProgressCallback};
