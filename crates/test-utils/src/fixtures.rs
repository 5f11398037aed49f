//! Common scenarios shared by the regridding tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::generators::{lon_lat_field, regular_points};
use field_common::Field;

/// Mean Earth radius used in the tests, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Forecast start used by the synthetic forecasts (2020-02-01T00:00Z).
pub fn forecast_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0)
        .single()
        .expect("valid fixture time")
}

/// Valid time `hours` after [`forecast_start`].
pub fn hours_after_start(hours: i64) -> DateTime<Utc> {
    forecast_start() + Duration::hours(hours)
}

/// Great-circle length of `degrees` of arc, in kilometres.
pub fn arc_km(degrees: f64) -> f64 {
    degrees.to_radians() * EARTH_RADIUS_KM
}

/// The 5x5 large grid spanning 0-4 degrees at 1 degree spacing.
pub mod five_by_five {
    use super::*;

    pub fn lons() -> Vec<f64> {
        regular_points(0.0, 1.0, 5)
    }

    pub fn lats() -> Vec<f64> {
        regular_points(0.0, 1.0, 5)
    }

    /// Boundary layer depth varying smoothly across the domain.
    pub fn boundary_layer_thickness() -> Field {
        lon_lat_field(
            "atmosphere_boundary_layer_thickness",
            &lons(),
            &lats(),
            |lon, lat| (500.0 + 10.0 * lon + lat) as f32,
        )
    }

    /// Trajectory positions for the first two lead times.
    pub const POSITIONS: [(f64, f64); 2] = [(2.0, 2.0), (2.5, 2.0)];

    /// A 2 degree diameter, widened by a hair so points exactly one degree
    /// from the centre survive rounding in the distance calculation.
    pub fn diameter_km() -> f64 {
        arc_km(2.0) * (1.0 + 1e-9)
    }
}
