//! Forecast sources.
//!
//! A forecast source yields one [`FieldCollection`] per lead time, in lead
//! time order. Sources are lazy: each step may read from disk.

use chrono::{DateTime, Duration, Utc};

use crate::collection::FieldCollection;

/// The fields of one forecast lead time.
#[derive(Debug, Clone)]
pub struct ForecastStep {
    /// Simulation time the fields are valid at.
    pub valid_time: DateTime<Utc>,
    /// Elapsed time since the forecast start.
    pub lead_time: Duration,
    pub fields: FieldCollection,
}

impl ForecastStep {
    pub fn new(valid_time: DateTime<Utc>, lead_time: Duration, fields: FieldCollection) -> Self {
        Self {
            valid_time,
            lead_time,
            fields,
        }
    }

    /// Whole hours since the forecast start.
    pub fn lead_hours(&self) -> i64 {
        crate::time::lead_hours(self.lead_time)
    }
}

/// A lazy, finite, non-restartable sequence of forecast steps.
pub trait ForecastSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Start time of the model run.
    fn start_time(&self) -> DateTime<Utc>;

    /// Read the next lead time, or `None` once every lead time was produced.
    fn next_step(&mut self) -> Option<Result<ForecastStep, Self::Error>>;

    /// Valid time of the most recently produced step.
    fn current_time(&self) -> Option<DateTime<Utc>>;

    /// Lead time of the most recently produced step.
    fn lead_time(&self) -> Option<Duration> {
        self.current_time().map(|t| t - self.start_time())
    }
}
