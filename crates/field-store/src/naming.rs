//! File naming for forecast inputs and regridded outputs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use field_common::time::COMPACT_FORMAT;

/// Suffix of every regridded output file.
pub const OUTPUT_SUFFIX: &str = "lagrangian_grid.zarr";

/// Path of the regridded collection for one lead time:
/// `{dir}/{start:%Y%m%dT%H%M}_{resolution}_T+{hours:02}_lagrangian_grid.zarr`.
pub fn output_path(
    dir: impl AsRef<Path>,
    start: DateTime<Utc>,
    resolution: &str,
    lead_hours: i64,
) -> PathBuf {
    dir.as_ref().join(format!(
        "{}_{}_T+{:02}_{}",
        start.format(COMPACT_FORMAT),
        resolution,
        lead_hours,
        OUTPUT_SUFFIX
    ))
}

/// Path of one forecast lead time:
/// `{root}[/{model_setup}]/{start:%Y%m%dT%H%M}_{resolution}_{output_type}_T+{hours:02}.zarr`.
pub fn forecast_path(
    root: impl AsRef<Path>,
    model_setup: Option<&str>,
    start: DateTime<Utc>,
    resolution: &str,
    output_type: &str,
    lead_hours: u32,
) -> PathBuf {
    let mut dir = root.as_ref().to_path_buf();
    if let Some(setup) = model_setup {
        dir.push(setup);
    }
    dir.join(format!(
        "{}_{}_{}_T+{:02}.zarr",
        start.format(COMPACT_FORMAT),
        resolution,
        output_type,
        lead_hours
    ))
}
