//! Configuration for field persistence and forecast discovery.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How stored arrays are encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Compression codec for Zarr arrays.
    pub compression: ZarrCompression,

    /// Compression level (1-9).
    pub compression_level: u8,

    /// Enable byte shuffle filter for better compression.
    pub shuffle: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compression: ZarrCompression::BloscZstd,
            compression_level: 1,
            shuffle: true,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ZARR_COMPRESSION") {
            config.compression = ZarrCompression::from_str(&val);
        }

        if let Ok(val) = std::env::var("ZARR_COMPRESSION_LEVEL") {
            if let Ok(level) = val.parse() {
                config.compression_level = level;
            }
        }

        if let Ok(val) = std::env::var("ZARR_SHUFFLE") {
            config.shuffle = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.compression_level == 0 || self.compression_level > 9 {
            return Err("compression_level must be 1-9".to_string());
        }
        Ok(())
    }
}

/// Compression codec for Zarr arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZarrCompression {
    /// No compression.
    None,
    /// Blosc with LZ4.
    BloscLz4,
    /// Blosc with Zstd (recommended).
    BloscZstd,
}

impl Default for ZarrCompression {
    fn default() -> Self {
        Self::BloscZstd
    }
}

impl ZarrCompression {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "none" => Self::None,
            "lz4" | "blosc_lz4" => Self::BloscLz4,
            _ => Self::BloscZstd,
        }
    }

    /// Get the codec name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BloscLz4 => "blosc_lz4",
            Self::BloscZstd => "blosc_zstd",
        }
    }
}

impl std::fmt::Display for ZarrCompression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a forecast lives on disk and which lead times to read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Root directory of the forecast files.
    pub path: PathBuf,

    /// Start time of the model run.
    pub start_time: DateTime<Utc>,

    /// Resolution tag used in file names, e.g. `km1p1`.
    pub resolution: String,

    /// Lead times to read, in hours.
    #[serde(default = "default_lead_times")]
    pub lead_times: Vec<u32>,

    /// Output variant selector used in file names.
    #[serde(default = "default_output_type")]
    pub output_type: String,

    /// Optional model configuration subdirectory below `path`.
    #[serde(default)]
    pub model_setup: Option<String>,
}

fn default_lead_times() -> Vec<u32> {
    (1..=48).collect()
}

fn default_output_type() -> String {
    "default".to_string()
}

impl ForecastConfig {
    /// Configuration with the default lead times (1 to 48 hours) and output type.
    pub fn new(path: impl Into<PathBuf>, start_time: DateTime<Utc>, resolution: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            start_time,
            resolution: resolution.into(),
            lead_times: default_lead_times(),
            output_type: default_output_type(),
            model_setup: None,
        }
    }

    pub fn with_lead_times(mut self, lead_times: impl IntoIterator<Item = u32>) -> Self {
        self.lead_times = lead_times.into_iter().collect();
        self
    }

    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = output_type.into();
        self
    }

    pub fn with_model_setup(mut self, model_setup: Option<String>) -> Self {
        self.model_setup = model_setup;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.resolution.is_empty() {
            return Err("resolution must not be empty".to_string());
        }
        if self.lead_times.is_empty() {
            return Err("at least one lead time is required".to_string());
        }
        if self.lead_times.windows(2).any(|w| w[1] <= w[0]) {
            return Err("lead times must be strictly increasing".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::forecast_start;

    #[test]
    fn test_store_config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.compression, ZarrCompression::BloscZstd);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_compression_from_str() {
        assert_eq!(ZarrCompression::from_str("NONE"), ZarrCompression::None);
        assert_eq!(ZarrCompression::from_str("lz4"), ZarrCompression::BloscLz4);
        assert_eq!(ZarrCompression::from_str("other"), ZarrCompression::BloscZstd);
    }

    #[test]
    fn test_forecast_config_defaults() {
        let config = ForecastConfig::new("/data", forecast_start(), "km1p1");
        assert_eq!(config.lead_times.first(), Some(&1));
        assert_eq!(config.lead_times.last(), Some(&48));
        assert_eq!(config.output_type, "default");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_forecast_config_rejects_unordered_lead_times() {
        let config =
            ForecastConfig::new("/data", forecast_start(), "km1p1").with_lead_times([3, 1]);
        assert!(config.validate().is_err());
    }
}
