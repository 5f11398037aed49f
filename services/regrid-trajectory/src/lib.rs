//! Command-line front end for trajectory-following regridding.
//!
//! `to-size` builds the moving window from a diameter around the trajectory,
//! `to-grid` moves a pre-built grid along it, and `column-budget` reduces
//! stored diagnostics to per-quartile column water tendencies.

pub mod commands;
pub mod config;

pub use commands::{ForecastOptions, RunSummary};
pub use config::{parse_log_level, AppConfig, LogFormat, LoggingConfig};
