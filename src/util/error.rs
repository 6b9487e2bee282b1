//! Error types for gridnms.

use thiserror::Error;

/// Result alias for gridnms operations.
pub type GridNmsResult<T> = std::result::Result<T, GridNmsError>;

/// Errors that can occur when configuring or running the detection pipeline.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridNmsError {
    /// The raw output element count does not match the configured layout.
    #[error("raw output shape mismatch: expected {expected} elements, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    /// A configuration value is missing or out of range.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfiguration {
        field: &'static str,
        reason: &'static str,
    },
}
