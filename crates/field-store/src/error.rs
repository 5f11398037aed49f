//! Error types for field persistence.

use field_common::FieldError;
use thiserror::Error;

/// Errors that can occur while saving or loading field collections.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open a stored collection.
    #[error("failed to open {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    /// Failed to read array data.
    #[error("failed to read field data: {0}")]
    ReadFailed(String),

    /// Failed to write array data or metadata.
    #[error("failed to write field data: {0}")]
    WriteFailed(String),

    /// Attributes are missing or malformed.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// The stored data does not form a valid field.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Storage/IO error.
    #[error("storage error: {0}")]
    StorageError(String),
}

impl StoreError {
    /// Create an OpenFailed error.
    pub fn open_failed(path: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        Self::OpenFailed {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create a WriteFailed error.
    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::WriteFailed(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
