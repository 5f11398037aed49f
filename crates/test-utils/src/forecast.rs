//! In-memory forecast source.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use field_common::{FieldCollection, ForecastSource, ForecastStep};

/// Failure injected into a synthetic forecast.
#[derive(Debug, thiserror::Error)]
#[error("synthetic forecast failure: {0}")]
pub struct SyntheticForecastError(pub String);

/// Forecast source backed by collections held in memory.
pub struct InMemoryForecast {
    start: DateTime<Utc>,
    steps: VecDeque<Result<ForecastStep, SyntheticForecastError>>,
    current: Option<DateTime<Utc>>,
    produced: usize,
}

impl InMemoryForecast {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            steps: VecDeque::new(),
            current: None,
            produced: 0,
        }
    }

    /// Append a lead time valid at `valid_time`.
    pub fn push(mut self, valid_time: DateTime<Utc>, fields: FieldCollection) -> Self {
        let lead = valid_time - self.start;
        self.steps
            .push_back(Ok(ForecastStep::new(valid_time, lead, fields)));
        self
    }

    /// Append a lead time whose read fails.
    pub fn push_failure(mut self, message: &str) -> Self {
        self.steps
            .push_back(Err(SyntheticForecastError(message.to_string())));
        self
    }

    /// Number of steps handed out so far.
    pub fn produced(&self) -> usize {
        self.produced
    }
}

impl ForecastSource for InMemoryForecast {
    type Error = SyntheticForecastError;

    fn start_time(&self) -> DateTime<Utc> {
        self.start
    }

    fn next_step(&mut self) -> Option<Result<ForecastStep, Self::Error>> {
        let step = self.steps.pop_front()?;
        self.produced += 1;
        if let Ok(step) = &step {
            self.current = Some(step.valid_time);
        }
        Some(step)
    }

    fn current_time(&self) -> Option<DateTime<Utc>> {
        self.current
    }
}
