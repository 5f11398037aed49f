//! Extract a small grid of data following a trajectory within a large domain.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use diagnostics::BUDGET_TERMS;
use regrid_trajectory::{commands, parse_log_level, AppConfig, ForecastOptions, LogFormat};

#[derive(Parser, Debug)]
#[command(name = "regrid-trajectory")]
#[command(about = "Extract a small grid of data following a trajectory within a large domain")]
struct Cli {
    /// Configuration file path (YAML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides the configuration file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ForecastArgs {
    /// Directory holding the forecast files
    forecast_path: PathBuf,

    /// Forecast start time, e.g. 20200201T0000
    forecast_start: String,

    /// Forecast resolution tag, e.g. km1p1
    forecast_resolution: String,

    /// Trajectory JSON file
    trajectory: PathBuf,

    /// Forecast output variant
    #[arg(long, default_value = "default")]
    output_type: String,

    /// Model setup subdirectory
    #[arg(long)]
    model_setup: Option<String>,

    /// Comma-separated lead hours (default: 1 to 48)
    #[arg(long, value_delimiter = ',')]
    lead_times: Option<Vec<u32>>,
}

impl From<&ForecastArgs> for ForecastOptions {
    fn from(args: &ForecastArgs) -> Self {
        Self {
            path: args.forecast_path.clone(),
            start: args.forecast_start.clone(),
            resolution: args.forecast_resolution.clone(),
            output_type: args.output_type.clone(),
            model_setup: args.model_setup.clone(),
            lead_times: args.lead_times.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the window from a circle around the trajectory start
    ToSize {
        #[command(flatten)]
        forecast: ForecastArgs,

        /// Window diameter in kilometres
        domain_size: f64,

        /// Where to save the regridded files
        #[arg(default_value = ".")]
        output_path: PathBuf,
    },

    /// Move a pre-built grid along the trajectory
    ToGrid {
        #[command(flatten)]
        forecast: ForecastArgs,

        /// Saved collection whose x/y coordinates define the window
        initial_grid: PathBuf,

        /// Field of the initial grid file to take the coordinates from
        #[arg(long)]
        grid_field: Option<String>,

        /// Where to save the regridded files
        #[arg(default_value = ".")]
        output_path: PathBuf,
    },

    /// Column water budget of moisture tracers, per quartile
    ColumnBudget {
        /// Saved collection of area-mean diagnostics
        input: PathBuf,

        /// Output JSON file
        output: PathBuf,

        /// Comma-separated budget terms
        #[arg(long, value_delimiter = ',')]
        terms: Option<Vec<String>>,

        /// First time coordinate value to keep
        #[arg(long)]
        time_start: Option<f64>,

        /// Last time coordinate value to keep
        #[arg(long)]
        time_end: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let json = cli.log_json || config.logging.format == LogFormat::Json;
    init_tracing(&level, json)?;

    info!(
        reference_field = %config.regrid.reference_field,
        empty_selection = %config.regrid.empty_selection,
        mdtol = config.regrid.mdtol,
        compression = %config.store.compression,
        "Loaded configuration"
    );

    match &cli.command {
        Commands::ToSize {
            forecast,
            domain_size,
            output_path,
        } => {
            commands::to_size(
                &config,
                &ForecastOptions::from(forecast),
                &forecast.trajectory,
                *domain_size,
                output_path,
            )?;
        }
        Commands::ToGrid {
            forecast,
            initial_grid,
            grid_field,
            output_path,
        } => {
            commands::to_grid(
                &config,
                &ForecastOptions::from(forecast),
                &forecast.trajectory,
                initial_grid,
                grid_field.as_deref(),
                output_path,
            )?;
        }
        Commands::ColumnBudget {
            input,
            output,
            terms,
            time_start,
            time_end,
        } => {
            let terms = terms.clone().unwrap_or_else(|| {
                BUDGET_TERMS.iter().map(|t| t.to_string()).collect()
            });
            let time_range = match (time_start, time_end) {
                (Some(start), Some(end)) => Some((*start, *end)),
                (None, None) => None,
                _ => bail!("--time-start and --time-end must be given together"),
            };
            commands::column_budget(input, output, &terms, time_range)?;
        }
    }

    Ok(())
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    let level = parse_log_level(level)?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}
