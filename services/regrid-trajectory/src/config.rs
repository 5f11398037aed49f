//! Service configuration.
//!
//! Settings come from a YAML file when `--config` is given, otherwise from
//! environment variables:
//!
//! ```yaml
//! regrid:
//!   reference_field: atmosphere_boundary_layer_thickness
//!   empty_selection: { policy: clamp, min_half_width: 2 }
//!   mdtol: 0.5
//! store:
//!   compression: blosc_lz4
//! logging:
//!   level: debug
//!   format: json
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;

use field_store::StoreConfig;
use trajectory_regrid::RegridConfig;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub regrid: RegridConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Parse a log level name, case-insensitively.
pub fn parse_log_level(level: &str) -> Result<Level> {
    Ok(match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => bail!(
            "Unknown log level '{}' (expected trace, debug, info, warn or error)",
            other
        ),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut logging = LoggingConfig::default();
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            if format.eq_ignore_ascii_case("json") {
                logging.format = LogFormat::Json;
            }
        }

        Self {
            regrid: RegridConfig::from_env(),
            store: StoreConfig::from_env(),
            logging,
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load from `path` if given, else from the environment, and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.regrid
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid regrid configuration: {}", e))?;
        self.store
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid store configuration: {}", e))?;
        parse_log_level(&self.logging.level).context("Invalid logging configuration")?;
        Ok(())
    }
}
