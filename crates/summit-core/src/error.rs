//! Error types for the Summit core.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in core operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Referenced demon or completion does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A demon with this id already exists
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Missing or malformed input (e.g. out-of-range position)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Completion state transition not permitted
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),
}
