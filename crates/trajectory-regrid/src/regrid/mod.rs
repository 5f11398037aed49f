//! Conservative (area-weighted) regridding of field collections.

mod weights;

pub use weights::{AreaWeights, AxisKind, AxisWeights};

use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;
use tracing::{debug, warn};

use field_common::{CoordAxis, Field, FieldCollection, FieldError, Grid};

use crate::config::RegridConfig;
use crate::error::Result;

/// Regrids every data field of a collection onto a target grid.
///
/// Zero- and one-dimensional fields and excluded coordinate carriers are
/// dropped from the output. Inputs are never modified; source coordinates
/// without bounds get inferred bounds on a working copy.
#[derive(Debug, Clone)]
pub struct ConservativeRegridder {
    excluded_fields: Vec<String>,
    mdtol: f64,
}

impl ConservativeRegridder {
    pub fn new(excluded_fields: Vec<String>, mdtol: f64) -> Self {
        Self {
            excluded_fields,
            mdtol,
        }
    }

    pub fn from_config(config: &RegridConfig) -> Self {
        Self::new(config.excluded_fields.clone(), config.mdtol)
    }

    /// Whether a field takes part in regridding.
    pub fn is_regriddable(&self, field: &Field) -> bool {
        field.ndim() > 1 && !self.excluded_fields.iter().any(|n| n == field.name())
    }

    /// Regrid every eligible field of `source` onto `target`.
    ///
    /// Fields are independent, so they are processed on the rayon pool.
    pub fn regrid(&self, source: &FieldCollection, target: &Grid) -> Result<FieldCollection> {
        let target = target.with_guessed_bounds()?;

        let eligible: Vec<&Field> = source.iter().filter(|f| self.is_regriddable(f)).collect();
        let skipped = source.len() - eligible.len();

        let regridded = eligible
            .par_iter()
            .map(|field| self.regrid_field(field, &target))
            .collect::<Result<Vec<Field>>>()?;

        debug!(
            regridded = regridded.len(),
            skipped,
            target_ny = target.shape().0,
            target_nx = target.shape().1,
            "Regridded field collection"
        );

        Ok(regridded.into_iter().collect())
    }

    /// Regrid a single field onto `target`, keeping every non-horizontal
    /// dimension as it is.
    pub fn regrid_field(&self, field: &Field, target: &Grid) -> Result<Field> {
        let (x_dim, src_x) = field.require_axis(CoordAxis::X)?;
        let (y_dim, src_y) = field.require_axis(CoordAxis::Y)?;
        let src_x = src_x.with_guessed_bounds()?;
        let src_y = src_y.with_guessed_bounds()?;
        let target = target.with_guessed_bounds()?;

        let weights = AreaWeights::compute(&src_y, &src_x, target.y(), target.x())?;
        let (ny, nx) = weights.target_shape();

        // Move y and x to the end so each horizontal slab is contiguous.
        let mut order: Vec<usize> = (0..field.ndim())
            .filter(|&d| d != x_dim && d != y_dim)
            .collect();
        let outer_shape: Vec<usize> = order.iter().map(|&d| field.shape()[d]).collect();
        order.push(y_dim);
        order.push(x_dim);

        let source = field
            .data()
            .view()
            .permuted_axes(IxDyn(&order))
            .as_standard_layout()
            .into_owned();
        let values = source.as_slice().ok_or_else(|| {
            FieldError::shape_mismatch(format!("data of '{}' is not contiguous", field.name()))
        })?;

        let slab_len = src_y.len() * src_x.len();
        let mut output = Vec::with_capacity(values.len() / slab_len * ny * nx);
        let mut masked = 0;
        for slab in values.chunks_exact(slab_len) {
            let (regridded, slab_masked) = weights.apply(slab, self.mdtol);
            masked += slab_masked;
            output.extend(regridded);
        }

        if masked > 0 {
            warn!(
                field = %field.name(),
                masked_cells = masked,
                total_cells = output.len(),
                "Target grid extends beyond source coverage"
            );
        }

        let mut out_shape = outer_shape;
        out_shape.push(ny);
        out_shape.push(nx);
        let permuted =
            ArrayD::from_shape_vec(IxDyn(&out_shape), output).map_err(FieldError::from)?;

        // Undo the permutation.
        let mut inverse = vec![0; order.len()];
        for (position, &dim) in order.iter().enumerate() {
            inverse[dim] = position;
        }
        let data = permuted
            .permuted_axes(IxDyn(&inverse))
            .as_standard_layout()
            .into_owned();

        Ok(field.with_data(
            data,
            vec![(y_dim, target.y().clone()), (x_dim, target.x().clone())],
        )?)
    }
}

/// Sum of `value * cell area` over a two-dimensional (y, x) field, skipping NaN.
///
/// Areas are on the unit sphere, matching the regridding weights.
pub fn area_integral(field: &Field) -> Result<f64> {
    let (x_dim, x) = field.require_axis(CoordAxis::X)?;
    let (y_dim, y) = field.require_axis(CoordAxis::Y)?;
    let x = x.with_guessed_bounds()?;
    let y = y.with_guessed_bounds()?;

    let widths: Vec<f64> = x
        .cell_widths()
        .unwrap_or_default()
        .iter()
        .map(|w| w.abs().to_radians())
        .collect();
    let heights: Vec<f64> = y
        .bounds()
        .unwrap_or_default()
        .iter()
        .map(|&[a, b]| {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            AxisKind::Latitude.measure(lo, hi)
        })
        .collect();

    let mut total = 0.0;
    for (index, &value) in field.data().indexed_iter() {
        if value.is_nan() {
            continue;
        }
        total += value as f64 * widths[index[x_dim]] * heights[index[y_dim]];
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_common::DimCoord;
    use test_utils::{
        assert_approx_eq, coordinate_field, height_coord, lat_coord, layered_field,
        lon_lat_field, lon_coord, regular_points, uniform_field,
    };

    fn regridder() -> ConservativeRegridder {
        ConservativeRegridder::from_config(&RegridConfig::default())
    }

    fn target(lons: Vec<f64>, lats: Vec<f64>) -> Grid {
        Grid::new(lat_coord(lats), lon_coord(lons)).unwrap()
    }

    #[test]
    fn test_uniform_field_preserved() {
        let lons = regular_points(0.0, 1.0, 10);
        let lats = regular_points(40.0, 1.0, 10);
        let field = uniform_field("specific_humidity", &lons, &lats, 0.012);

        let grid = target(regular_points(2.3, 0.7, 5), regular_points(42.1, 0.9, 4));
        let out = regridder().regrid_field(&field, &grid).unwrap();

        assert_eq!(out.shape(), &[4, 5]);
        for &v in out.data().iter() {
            assert_approx_eq!(v, 0.012, 1e-7);
        }
    }

    #[test]
    fn test_identity_grid_returns_source() {
        let lons = regular_points(0.0, 1.0, 4);
        let lats = regular_points(0.0, 1.0, 3);
        let field = lon_lat_field("t", &lons, &lats, |lon, lat| (lon * 10.0 + lat) as f32);

        let out = regridder()
            .regrid_field(&field, &Grid::from_field(&field).unwrap())
            .unwrap();
        for (a, b) in out.data().iter().zip(field.data().iter()) {
            assert_approx_eq!(*a, *b, 1e-4);
        }
    }

    #[test]
    fn test_coarsening_conserves_integral() {
        let lons = regular_points(0.25, 0.5, 8);
        let lats = regular_points(10.25, 0.5, 8);
        let field = lon_lat_field("rain", &lons, &lats, |lon, lat| (lon + 2.0 * lat) as f32);

        let grid = target(regular_points(0.5, 1.0, 4), regular_points(10.5, 1.0, 4));
        let out = regridder().regrid_field(&field, &grid).unwrap();

        let before = area_integral(&field).unwrap();
        let after = area_integral(&out).unwrap();
        assert_approx_eq!(after, before, before.abs() * 1e-6);
    }

    #[test]
    fn test_partial_coverage_is_masked_not_error() {
        let lons = regular_points(0.0, 1.0, 5);
        let lats = regular_points(0.0, 1.0, 5);
        let field = uniform_field("f", &lons, &lats, 1.0);

        let grid = target(vec![3.0, 4.0, 5.0, 6.0], vec![1.0, 2.0]);
        let out = regridder().regrid_field(&field, &grid).unwrap();

        assert_approx_eq!(out.data()[[0, 0]], 1.0, 1e-6);
        assert!(out.data()[[0, 2]].is_nan());
        assert!(out.data()[[1, 3]].is_nan());
    }

    #[test]
    fn test_extra_dimensions_preserved() {
        let z = height_coord("altitude", vec![5.0, 15.0, 25.0]);
        let lons = regular_points(0.0, 1.0, 6);
        let lats = regular_points(0.0, 1.0, 6);
        let field = layered_field("q", z, &lons, &lats, |k, _, _| k as f32 + 1.0);

        let grid = target(vec![2.0, 3.0], vec![2.0, 3.0, 4.0]);
        let out = regridder().regrid_field(&field, &grid).unwrap();

        assert_eq!(out.shape(), &[3, 3, 2]);
        assert_eq!(out.coord_for_dim(0).unwrap().name(), "altitude");
        for k in 0..3 {
            assert_approx_eq!(out.data()[[k, 1, 1]], k as f32 + 1.0, 1e-6);
        }
    }

    #[test]
    fn test_x_before_y_layout() {
        let lons = regular_points(0.0, 1.0, 4);
        let lats = regular_points(0.0, 1.0, 3);
        let data = ArrayD::from_shape_fn(IxDyn(&[4, 3]), |ix| ix[0] as f32);
        let field = Field::new(
            "transposed",
            data,
            vec![(lon_coord(lons), 0), (lat_coord(lats), 1)],
        )
        .unwrap();

        let grid = target(vec![1.0, 2.0], vec![1.0, 2.0]);
        let out = regridder().regrid_field(&field, &grid).unwrap();

        assert_eq!(out.shape(), &[2, 2]);
        assert_approx_eq!(out.data()[[0, 0]], 1.0, 1e-6);
        assert_approx_eq!(out.data()[[1, 0]], 2.0, 1e-6);
    }

    #[test]
    fn test_regrid_collection_skips_coordinate_fields() {
        let lons = regular_points(0.0, 1.0, 5);
        let lats = regular_points(0.0, 1.0, 5);
        let source: FieldCollection = vec![
            uniform_field("air_temperature", &lons, &lats, 280.0),
            coordinate_field("longitude", &lons),
            coordinate_field("latitude", &lats),
        ]
        .into_iter()
        .collect();

        let out = regridder()
            .regrid(&source, &target(vec![1.0, 2.0], vec![1.0, 2.0]))
            .unwrap();

        assert_eq!(out.names().collect::<Vec<_>>(), vec!["air_temperature"]);
    }

    #[test]
    fn test_excluded_two_dimensional_field_is_skipped() {
        let lons = regular_points(0.0, 1.0, 3);
        let lats = regular_points(0.0, 1.0, 3);
        let source: FieldCollection =
            std::iter::once(uniform_field("longitude", &lons, &lats, 0.0)).collect();

        let out = regridder()
            .regrid(&source, &target(vec![1.0, 2.0], vec![1.0, 2.0]))
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_horizontal_coordinate_is_error() {
        let z = height_coord("altitude", vec![1.0, 2.0]);
        let t = DimCoord::new("time", CoordAxis::T, vec![0.0, 1.0]);
        let data = ArrayD::zeros(IxDyn(&[2, 2]));
        let field = Field::new("profile", data, vec![(t, 0), (z, 1)]).unwrap();

        assert!(regridder()
            .regrid_field(&field, &target(vec![1.0, 2.0], vec![1.0, 2.0]))
            .is_err());
    }
}
