//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use diagnostics::{BudgetOptions, ColumnBudget};
use field_common::parse_forecast_start;
use field_store::{
    load_grid, output_path, read_collection, CollectionMetadata, ForecastConfig,
    ZarrFieldWriter, ZarrForecast,
};
use trajectory_regrid::{Trajectory, TrajectoryFollower, Window};

use crate::config::AppConfig;

/// Which forecast to read.
#[derive(Debug, Clone)]
pub struct ForecastOptions {
    pub path: PathBuf,
    /// Start time as given on the command line, e.g. `20200201T0000`.
    pub start: String,
    pub resolution: String,
    pub output_type: String,
    pub model_setup: Option<String>,
    /// Lead hours to read; all 48 hourly outputs when not given.
    pub lead_times: Option<Vec<u32>>,
}

impl ForecastOptions {
    pub fn to_config(&self) -> Result<ForecastConfig> {
        let start = parse_forecast_start(&self.start)
            .with_context(|| format!("Invalid forecast start '{}'", self.start))?;

        let mut config = ForecastConfig::new(&self.path, start, &self.resolution)
            .with_output_type(&self.output_type)
            .with_model_setup(self.model_setup.clone());
        if let Some(lead_times) = &self.lead_times {
            config = config.with_lead_times(lead_times.iter().copied());
        }
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }
}

/// Files written by a regridding run.
#[derive(Debug)]
pub struct RunSummary {
    pub outputs: Vec<PathBuf>,
}

/// Build the window from a circle of `diameter_km` around the trajectory and
/// regrid every lead time onto it.
pub fn to_size(
    config: &AppConfig,
    forecast: &ForecastOptions,
    trajectory: &Path,
    diameter_km: f64,
    output_dir: &Path,
) -> Result<RunSummary> {
    info!(diameter_km, "Building window from diameter");
    follow(
        config,
        forecast,
        trajectory,
        Window::Diameter(diameter_km),
        output_dir,
    )
}

/// Regrid every lead time onto the grid stored at `grid_path`, moved along
/// the trajectory.
pub fn to_grid(
    config: &AppConfig,
    forecast: &ForecastOptions,
    trajectory: &Path,
    grid_path: &Path,
    grid_field: Option<&str>,
    output_dir: &Path,
) -> Result<RunSummary> {
    let grid = load_grid(grid_path, grid_field)
        .with_context(|| format!("Failed to load grid from {}", grid_path.display()))?;
    info!(path = %grid_path.display(), shape = ?grid.shape(), "Loaded window grid");
    follow(config, forecast, trajectory, Window::Grid(grid), output_dir)
}

fn follow(
    config: &AppConfig,
    forecast: &ForecastOptions,
    trajectory: &Path,
    window: Window,
    output_dir: &Path,
) -> Result<RunSummary> {
    let forecast_config = forecast.to_config()?;
    let start = forecast_config.start_time;
    let resolution = forecast_config.resolution.clone();

    let trajectory = Trajectory::from_json_file(trajectory)
        .with_context(|| format!("Failed to load trajectory {}", trajectory.display()))?;
    let source = ZarrForecast::new(forecast_config)?;
    let follower = TrajectoryFollower::new(source, trajectory, window, &config.regrid)?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let writer = ZarrFieldWriter::new(config.store.clone());

    let mut outputs = Vec::new();
    for frame in follower {
        let frame = frame?;
        let lead_hours = frame.lead_hours();
        let path = output_path(output_dir, start, &resolution, lead_hours);
        let metadata = CollectionMetadata {
            forecast_start: Some(start),
            valid_time: Some(frame.valid_time),
            lead_hours: Some(lead_hours),
            resolution: Some(resolution.clone()),
        };

        let summary = writer
            .write_collection(&path, &frame.fields, &metadata)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        info!(
            path = %path.display(),
            fields = summary.fields,
            bytes = summary.bytes_written,
            "Saved regridded frame"
        );
        outputs.push(path);
    }

    info!(frames = outputs.len(), "Trajectory regridding completed");
    Ok(RunSummary { outputs })
}

/// Compute the column budget of the diagnostics stored at `input` and write
/// it as JSON to `output`.
pub fn column_budget(
    input: &Path,
    output: &Path,
    terms: &[String],
    time_range: Option<(f64, f64)>,
) -> Result<ColumnBudget> {
    let collection = read_collection(input)
        .with_context(|| format!("Failed to read diagnostics from {}", input.display()))?;

    let terms: Vec<&str> = terms.iter().map(String::as_str).collect();
    let options = BudgetOptions {
        time_range,
        ..Default::default()
    };
    let budget = diagnostics::column_budget(&collection, &terms, &options)?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, budget.to_json()?)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(path = %output.display(), terms = terms.len(), "Saved column budget");

    Ok(budget)
}
