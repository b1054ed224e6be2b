//! Error types for the Summit node, with their HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in node operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Domain error from the core list/workflow logic
    #[error(transparent)]
    Core(#[from] summit_core::Error),

    /// Referenced account or resource absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Account already exists
    #[error("Already exists: {0}")]
    Duplicate(String),

    /// Missing or malformed request field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bad credentials or banned account
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(e: rocksdb::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl Error {
    /// The status code a request boundary reports for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Core(summit_core::Error::NotFound(_)) | Error::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Error::Core(summit_core::Error::DuplicateId(_)) | Error::Duplicate(_) => {
                StatusCode::CONFLICT
            }
            Error::Core(summit_core::Error::InvalidInput(_))
            | Error::Core(summit_core::Error::InvalidTransition(_))
            | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Storage(_) | Error::Serialization(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
