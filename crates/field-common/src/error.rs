//! Error types for field and coordinate operations.

use thiserror::Error;

/// Result type alias using FieldError.
pub type FieldResult<T> = Result<T, FieldError>;

/// Errors raised by the field data model.
#[derive(Debug, Error)]
pub enum FieldError {
    /// None of the recognised names (or axes) matched a dimensional coordinate.
    #[error("field '{field}' has no dimensional coordinate named any of {names:?}")]
    MissingCoordinate { field: String, names: Vec<String> },

    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// Bounds could not be derived from the coordinate points.
    #[error("cannot infer bounds for coordinate '{coord}': {reason}")]
    BoundsInference { coord: String, reason: String },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("invalid time '{value}': expected a forecast start such as 20200201T0000")]
    InvalidTime { value: String },

    /// A subset request selected no points along a coordinate.
    #[error("no points of coordinate '{coord}' fall within [{min}, {max}]")]
    EmptySelection { coord: String, min: f64, max: f64 },
}

impl FieldError {
    /// Create a MissingCoordinate error.
    pub fn missing_coordinate<S: AsRef<str>>(field: impl Into<String>, names: &[S]) -> Self {
        Self::MissingCoordinate {
            field: field.into(),
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
        }
    }

    /// Create a BoundsInference error.
    pub fn bounds_inference(coord: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BoundsInference {
            coord: coord.into(),
            reason: reason.into(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }
}

impl From<ndarray::ShapeError> for FieldError {
    fn from(err: ndarray::ShapeError) -> Self {
        FieldError::ShapeMismatch(err.to_string())
    }
}
