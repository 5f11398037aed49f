//! Building the fixed-size window around the trajectory start.

use tracing::{debug, warn};

use field_common::{CoordAxis, DimCoord, Field, Grid};

use crate::config::{EmptySelectionPolicy, RegridConfig};
use crate::error::{RegridError, Result};
use crate::geodesic::{haversine_km, meshgrid, GeodesicMask};

/// Cuts the smallest rectangular sub-grid enclosing a circle out of a
/// large grid.
///
/// The result is the axis-aligned box around every grid point within the
/// circle, so its corners can lie farther than the radius from the centre.
#[derive(Debug, Clone)]
pub struct GridBuilder {
    earth_radius_km: f64,
    empty_selection: EmptySelectionPolicy,
}

impl GridBuilder {
    pub fn new(earth_radius_km: f64, empty_selection: EmptySelectionPolicy) -> Self {
        Self {
            earth_radius_km,
            empty_selection,
        }
    }

    pub fn from_config(config: &RegridConfig) -> Self {
        Self::new(config.earth_radius_km, config.empty_selection)
    }

    /// Build the window and return its horizontal grid.
    pub fn build(
        &self,
        large_grid: &Field,
        center_lon: f64,
        center_lat: f64,
        diameter_km: f64,
    ) -> Result<Grid> {
        let window = self.build_field(large_grid, center_lon, center_lat, diameter_km)?;
        Ok(Grid::from_field(&window)?)
    }

    /// Build the window and return `large_grid` subset to it.
    pub fn build_field(
        &self,
        large_grid: &Field,
        center_lon: f64,
        center_lat: f64,
        diameter_km: f64,
    ) -> Result<Field> {
        if !(diameter_km > 0.0) {
            return Err(RegridError::config(format!(
                "window diameter must be positive, got {}",
                diameter_km
            )));
        }

        let (_, lon) = large_grid.require_axis(CoordAxis::X)?;
        let (_, lat) = large_grid.require_axis(CoordAxis::Y)?;

        let (xg, yg) = meshgrid(lon.points(), lat.points());
        let mask = GeodesicMask::compute(
            &xg,
            &yg,
            (center_lon, center_lat),
            diameter_km,
            self.earth_radius_km,
        )?;

        let (x_range, y_range) = if mask.is_empty() {
            self.empty_selection_ranges(lon, lat, center_lon, center_lat, diameter_km)?
        } else {
            let x_range = if lon.is_circular() {
                // Unwrap around the centre so a circle across the seam gives
                // a contiguous range instead of the whole globe.
                extent(
                    mask.retained_values(&xg)
                        .map(|x| center_lon + (x - center_lon + 180.0).rem_euclid(360.0) - 180.0),
                )
            } else {
                extent(mask.retained_values(&xg))
            };
            let y_range = extent(mask.retained_values(&yg));
            match (x_range, y_range) {
                (Some(x), Some(y)) => (x, y),
                _ => {
                    return Err(RegridError::EmptyGeometry {
                        lon: center_lon,
                        lat: center_lat,
                        diameter_km,
                    })
                }
            }
        };

        debug!(
            field = %large_grid.name(),
            center_lon,
            center_lat,
            diameter_km,
            retained = mask.retained(),
            x_min = x_range.0,
            x_max = x_range.1,
            y_min = y_range.0,
            y_max = y_range.1,
            "Built window bounding box"
        );

        // Edges come from the full grid so a one-point window still has cells.
        let mut bounded = large_grid.clone();
        for axis in [CoordAxis::X, CoordAxis::Y] {
            let (dim, coord) = large_grid.require_axis(axis)?;
            bounded.replace_coord(dim, coord.with_guessed_bounds()?)?;
        }
        Ok(bounded.intersection(x_range, y_range)?)
    }

    /// Ranges used when no point falls inside the circle.
    fn empty_selection_ranges(
        &self,
        lon: &DimCoord,
        lat: &DimCoord,
        center_lon: f64,
        center_lat: f64,
        diameter_km: f64,
    ) -> Result<((f64, f64), (f64, f64))> {
        let min_half_width = match self.empty_selection {
            EmptySelectionPolicy::Fail => {
                return Err(RegridError::EmptyGeometry {
                    lon: center_lon,
                    lat: center_lat,
                    diameter_km,
                })
            }
            EmptySelectionPolicy::Clamp { min_half_width } => min_half_width,
        };

        let mut nearest: Option<(usize, usize, f64)> = None;
        for (j, &y) in lat.points().iter().enumerate() {
            for (i, &x) in lon.points().iter().enumerate() {
                let d = haversine_km(x, y, center_lon, center_lat, self.earth_radius_km);
                if nearest.map_or(true, |(_, _, best)| d < best) {
                    nearest = Some((i, j, d));
                }
            }
        }
        let (i, j, distance_km) = nearest.ok_or(RegridError::EmptyGeometry {
            lon: center_lon,
            lat: center_lat,
            diameter_km,
        })?;

        warn!(
            center_lon,
            center_lat,
            diameter_km,
            nearest_km = distance_km,
            min_half_width,
            "No grid points inside window circle; clamping to nearest point"
        );

        let x_range = window_around(lon.points(), i, min_half_width);
        let y_range = window_around(lat.points(), j, min_half_width);
        Ok((x_range, y_range))
    }
}

/// Min and max of an iterator of finite values.
fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

/// Value range of the points within `half_width` indices of `index`.
fn window_around(points: &[f64], index: usize, half_width: usize) -> (f64, f64) {
    let start = index.saturating_sub(half_width);
    let end = (index + half_width).min(points.len().saturating_sub(1));
    let (a, b) = (points[start], points[end]);
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{arc_km, five_by_five, lon_lat_field, regular_points, EARTH_RADIUS_KM};

    fn builder() -> GridBuilder {
        GridBuilder::new(EARTH_RADIUS_KM, EmptySelectionPolicy::Fail)
    }

    #[test]
    fn test_build_scenario_window() {
        let large = five_by_five::boundary_layer_thickness();
        let grid = builder()
            .build(&large, 2.0, 2.0, five_by_five::diameter_km())
            .unwrap();

        assert_eq!(grid.x().points(), &[1.0, 2.0, 3.0]);
        assert_eq!(grid.y().points(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_build_field_keeps_data() {
        let large = five_by_five::boundary_layer_thickness();
        let window = builder()
            .build_field(&large, 2.0, 2.0, five_by_five::diameter_km())
            .unwrap();

        assert_eq!(window.shape(), &[3, 3]);
        assert_eq!(window.data()[[0, 0]], large.data()[[1, 1]]);
    }

    #[test]
    fn test_box_is_not_circle() {
        // Corners of the box are farther than the radius from the centre.
        let large = five_by_five::boundary_layer_thickness();
        let diameter = five_by_five::diameter_km();
        let grid = builder().build(&large, 2.0, 2.0, diameter).unwrap();

        let corner = haversine_km(1.0, 1.0, 2.0, 2.0, EARTH_RADIUS_KM);
        assert!(corner > diameter / 2.0);
        assert_eq!(grid.shape(), (3, 3));
    }

    #[test]
    fn test_single_point_window_keeps_source_edges() {
        let large = five_by_five::boundary_layer_thickness();
        let grid = builder().build(&large, 2.0, 2.0, arc_km(0.5)).unwrap();

        assert_eq!(grid.x().points(), &[2.0]);
        assert_eq!(grid.y().points(), &[2.0]);
        assert_eq!(grid.x().bounds(), Some(&[[1.5, 2.5]][..]));
        assert_eq!(grid.y().bounds(), Some(&[[1.5, 2.5]][..]));
    }

    #[test]
    fn test_empty_selection_fails() {
        let large = five_by_five::boundary_layer_thickness();
        let err = builder().build(&large, 40.0, 40.0, arc_km(1.0)).unwrap_err();
        assert!(matches!(err, RegridError::EmptyGeometry { .. }));
    }

    #[test]
    fn test_empty_selection_clamps() {
        let large = five_by_five::boundary_layer_thickness();
        let builder = GridBuilder::new(
            EARTH_RADIUS_KM,
            EmptySelectionPolicy::Clamp { min_half_width: 1 },
        );
        let grid = builder.build(&large, 10.0, 2.0, arc_km(0.5)).unwrap();

        // Nearest point is (4, 2); one point either side, clipped at the edge
        assert_eq!(grid.x().points(), &[3.0, 4.0]);
        assert_eq!(grid.y().points(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rejects_non_positive_diameter() {
        let large = five_by_five::boundary_layer_thickness();
        assert!(matches!(
            builder().build(&large, 2.0, 2.0, 0.0),
            Err(RegridError::Config(_))
        ));
    }

    #[test]
    fn test_build_across_longitude_seam() {
        let lons = regular_points(0.0, 1.0, 360);
        let lats = regular_points(-5.0, 1.0, 11);
        let field = lon_lat_field("f", &lons, &lats, |lon, _| lon as f32);
        let x = field.coord_by_axis(CoordAxis::X).unwrap().1.clone().with_circular(true);
        let mut field = field;
        field.replace_coord(1, x).unwrap();

        let grid = builder().build(&field, 0.0, 0.0, arc_km(2.0) * (1.0 + 1e-9)).unwrap();

        assert_eq!(grid.x().points(), &[-1.0, 0.0, 1.0]);
        assert_eq!(grid.y().points(), &[-1.0, 0.0, 1.0]);
    }
}
