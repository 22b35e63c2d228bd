//! Error types for the recall retrieval library.

use thiserror::Error;

/// Result type alias using recall's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for recall operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Knowledge item not found under the tenant-scoped lookup
    #[error("Knowledge item not found: {0}")]
    ItemNotFound(uuid::Uuid),

    /// Embedding generation failed; fatal to the enclosing operation
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index unavailable or rejected a call; recovered by fallback
    #[error("Vector index error: {0}")]
    Index(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input rejected before any store was touched
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
