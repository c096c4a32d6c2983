//! Error types for the dime library

use std::io;
use thiserror::Error;

/// Main error type for dime operations
#[derive(Debug, Error)]
pub enum DxfError {
    /// IO error occurred during stream operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// End of stream where a record was expected
    #[error("unexpected end of stream at {0}")]
    Truncated(String),

    /// Malformed input: bad numeric literal, unexpected group code at a
    /// structural boundary, unterminated section/block/polyline
    #[error("parse error: {0}")]
    Parse(String),

    /// The generic record setter was used for a group code that has a
    /// dedicated typed setter (layer on entities, block name on INSERT)
    #[error("group code {0} cannot be set through set_record; use the typed setter")]
    IllegalSetter(i32),

    /// A block with this name is already registered in the model
    #[error("duplicate block name: {0}")]
    DuplicateBlock(String),

    /// The progress callback requested an abort
    #[error("operation aborted by progress callback")]
    Aborted,

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for dime operations
pub type Result<T> = std::result::Result<T, DxfError>;

impl From<String> for DxfError {
    fn from(s: String) -> Self {
        DxfError::Custom(s)
    }
}

impl From<&str> for DxfError {
    fn from(s: &str) -> Self {
        DxfError::Custom(s.to_string())
    }
}
