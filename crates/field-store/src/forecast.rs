//! Forecasts stored as one Zarr hierarchy per lead time.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use field_common::{ForecastSource, ForecastStep};

use crate::config::ForecastConfig;
use crate::error::{Result, StoreError};
use crate::naming::forecast_path;
use crate::reader::read_collection;

/// A forecast read lazily from disk, one lead time per step.
pub struct ZarrForecast {
    config: ForecastConfig,
    next_index: usize,
    current: Option<DateTime<Utc>>,
}

impl ZarrForecast {
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate().map_err(StoreError::ConfigError)?;
        Ok(Self {
            config,
            next_index: 0,
            current: None,
        })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Lead times not yet read.
    pub fn remaining(&self) -> &[u32] {
        &self.config.lead_times[self.next_index.min(self.config.lead_times.len())..]
    }

    fn read_step(&self, hours: u32) -> Result<ForecastStep> {
        let path = forecast_path(
            &self.config.path,
            self.config.model_setup.as_deref(),
            self.config.start_time,
            &self.config.resolution,
            &self.config.output_type,
            hours,
        );
        let lead_time = Duration::hours(i64::from(hours));
        let valid_time = self.config.start_time + lead_time;

        info!(
            path = %path.display(),
            lead_hours = hours,
            valid_time = %valid_time,
            "Reading forecast lead time"
        );
        let fields = read_collection(&path)?;
        Ok(ForecastStep::new(valid_time, lead_time, fields))
    }
}

impl ForecastSource for ZarrForecast {
    type Error = StoreError;

    fn start_time(&self) -> DateTime<Utc> {
        self.config.start_time
    }

    fn next_step(&mut self) -> Option<Result<ForecastStep>> {
        let hours = *self.config.lead_times.get(self.next_index)?;
        self.next_index += 1;

        let step = self.read_step(hours);
        if let Ok(step) = &step {
            self.current = Some(step.valid_time);
        }
        Some(step)
    }

    fn current_time(&self) -> Option<DateTime<Utc>> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::forecast_start;

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ForecastConfig::new(dir.path(), forecast_start(), "km1p1").with_lead_times([1]);
        let mut forecast = ZarrForecast::new(config).unwrap();

        assert!(matches!(
            forecast.next_step(),
            Some(Err(StoreError::OpenFailed { .. }))
        ));
        assert!(forecast.next_step().is_none());
        assert_eq!(forecast.current_time(), None);
    }

    #[test]
    fn test_rejects_empty_lead_times() {
        let config = ForecastConfig::new("/data", forecast_start(), "km1p1").with_lead_times(Vec::new());
        assert!(matches!(
            ZarrForecast::new(config),
            Err(StoreError::ConfigError(_))
        ));
    }
}
