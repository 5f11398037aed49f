//! Error types for diagnostics.

use field_common::FieldError;
use thiserror::Error;

/// Errors raised while deriving diagnostics.
#[derive(Error, Debug)]
pub enum DiagnosticsError {
    /// Coordinate lookup, subsetting or reshaping failed.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// A diagnostic needs input the field cannot provide.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiagnosticsError {
    /// Create an InvalidInput error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type for diagnostics.
pub type Result<T> = std::result::Result<T, DiagnosticsError>;
