//! Synthetic field generators.
//!
//! Fields put y on dimension 0 and x on dimension 1, with an optional
//! leading vertical or time dimension, matching model output layout.

use field_common::{CoordAxis, DimCoord, Field};
use ndarray::{ArrayD, IxDyn};

/// `n` evenly spaced values starting at `start`.
///
/// # Example
///
/// ```
/// use test_utils::regular_points;
///
/// assert_eq!(regular_points(0.0, 0.5, 3), vec![0.0, 0.5, 1.0]);
/// ```
pub fn regular_points(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Longitude coordinate without bounds.
pub fn lon_coord(points: Vec<f64>) -> DimCoord {
    DimCoord::new("longitude", CoordAxis::X, points).with_units("degrees")
}

/// Latitude coordinate without bounds.
pub fn lat_coord(points: Vec<f64>) -> DimCoord {
    DimCoord::new("latitude", CoordAxis::Y, points).with_units("degrees")
}

/// Two-dimensional (latitude, longitude) field with values from `f(lon, lat)`.
pub fn lon_lat_field<F>(name: &str, lons: &[f64], lats: &[f64], f: F) -> Field
where
    F: Fn(f64, f64) -> f32,
{
    let data = ArrayD::from_shape_fn(IxDyn(&[lats.len(), lons.len()]), |ix| {
        f(lons[ix[1]], lats[ix[0]])
    });
    Field::new(
        name,
        data,
        vec![(lat_coord(lats.to_vec()), 0), (lon_coord(lons.to_vec()), 1)],
    )
    .expect("synthetic field shape")
}

/// Two-dimensional field holding the same value everywhere.
pub fn uniform_field(name: &str, lons: &[f64], lats: &[f64], value: f32) -> Field {
    lon_lat_field(name, lons, lats, |_, _| value)
}

/// Three-dimensional (z, latitude, longitude) field with values from
/// `f(level_index, lon, lat)`.
pub fn layered_field<F>(
    name: &str,
    z: DimCoord,
    lons: &[f64],
    lats: &[f64],
    f: F,
) -> Field
where
    F: Fn(usize, f64, f64) -> f32,
{
    let data = ArrayD::from_shape_fn(IxDyn(&[z.len(), lats.len(), lons.len()]), |ix| {
        f(ix[0], lons[ix[2]], lats[ix[1]])
    });
    Field::new(
        name,
        data,
        vec![
            (z, 0),
            (lat_coord(lats.to_vec()), 1),
            (lon_coord(lons.to_vec()), 2),
        ],
    )
    .expect("synthetic field shape")
}

/// Vertical coordinate of heights in metres.
pub fn height_coord(name: &str, levels: Vec<f64>) -> DimCoord {
    DimCoord::new(name, CoordAxis::Z, levels).with_units("m")
}

/// One-dimensional coordinate-carrier field, as model output stores
/// longitude and latitude alongside the data.
pub fn coordinate_field(name: &str, points: &[f64]) -> Field {
    let axis = if name == "latitude" {
        CoordAxis::Y
    } else {
        CoordAxis::X
    };
    let data = ArrayD::from_shape_fn(IxDyn(&[points.len()]), |ix| points[ix[0]] as f32);
    Field::new(name, data, vec![(DimCoord::new(name, axis, points.to_vec()), 0)])
        .expect("synthetic coordinate field")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_lat_field_layout() {
        let lons = regular_points(0.0, 1.0, 3);
        let lats = regular_points(10.0, 1.0, 2);
        let field = lon_lat_field("f", &lons, &lats, |lon, lat| (lon * 100.0 + lat) as f32);

        assert_eq!(field.shape(), &[2, 3]);
        assert_eq!(field.data()[[1, 2]], 211.0);
    }

    #[test]
    fn test_layered_field_layout() {
        let z = height_coord("altitude", vec![10.0, 20.0]);
        let lons = regular_points(0.0, 1.0, 2);
        let lats = regular_points(0.0, 1.0, 2);
        let field = layered_field("q", z, &lons, &lats, |k, _, _| k as f32);

        assert_eq!(field.shape(), &[2, 2, 2]);
        assert_eq!(field.data()[[1, 0, 0]], 1.0);
    }
}
