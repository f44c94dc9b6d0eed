//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only caller-facing failures live here. Connection failures on the push side are
/// recovered inside the hub and never reach a caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The request could not be decoded, or a required field (e.g. `id`) was missing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested operation is not one of create/update/delete.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }
}
