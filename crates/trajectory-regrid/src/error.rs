//! Error types for trajectory regridding.

use chrono::{DateTime, Utc};
use field_common::FieldError;
use thiserror::Error;

/// Errors that can occur while building, moving or filling the window.
#[derive(Error, Debug)]
pub enum RegridError {
    /// Coordinate lookup, bounds inference or subsetting failed.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The circular selection around the trajectory kept no grid points.
    #[error(
        "no grid points within {diameter_km} km diameter of ({lon}, {lat}); \
         the trajectory may be outside the forecast domain"
    )]
    EmptyGeometry {
        lon: f64,
        lat: f64,
        diameter_km: f64,
    },

    /// The trajectory has no position at a forecast time.
    #[error("trajectory has no position at {0}")]
    TrajectoryTime(DateTime<Utc>),

    /// The trajectory file could not be parsed.
    #[error("invalid trajectory: {0}")]
    InvalidTrajectory(String),

    /// Reading the next forecast lead time failed.
    #[error("forecast read failed: {0}")]
    Forecast(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegridError {
    /// Create an InvalidTrajectory error.
    pub fn invalid_trajectory(msg: impl Into<String>) -> Self {
        Self::InvalidTrajectory(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a forecast source error.
    pub fn forecast<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Forecast(Box::new(err))
    }
}

impl From<serde_json::Error> for RegridError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidTrajectory(err.to_string())
    }
}

/// Result type for regridding operations.
pub type Result<T> = std::result::Result<T, RegridError>;
