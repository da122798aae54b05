//! Error types for document model operations.

use thiserror::Error;

/// Errors raised by position resolution and content replacement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// A position outside the content it was resolved against.
    #[error("position {pos} out of range for content of size {size}")]
    PositionOutOfRange { pos: usize, size: usize },

    /// A slice that does not fit where it was inserted.
    #[error("invalid replace: {0}")]
    Replace(#[from] ReplaceError),
}

/// A structural replace that cannot be performed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ReplaceError(pub String);

impl From<&str> for ReplaceError {
    fn from(s: &str) -> Self {
        ReplaceError(s.to_string())
    }
}

impl From<String> for ReplaceError {
    fn from(s: String) -> Self {
        ReplaceError(s)
    }
}
