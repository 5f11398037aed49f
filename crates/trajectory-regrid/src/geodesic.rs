//! Great-circle distance masks.

use ndarray::{Array2, Zip};

use field_common::{FieldError, FieldResult};

/// Great-circle distance between two points in kilometres (haversine formula).
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64, radius_km: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    radius_km * c
}

/// Expand x and y points into `(ny, nx)` coordinate meshes.
pub fn meshgrid(x: &[f64], y: &[f64]) -> (Array2<f64>, Array2<f64>) {
    let shape = (y.len(), x.len());
    let xg = Array2::from_shape_fn(shape, |(_, i)| x[i]);
    let yg = Array2::from_shape_fn(shape, |(j, _)| y[j]);
    (xg, yg)
}

/// Flags the points farther than half a diameter from a centre point.
///
/// `true` marks a point to exclude; the retained points are the complement.
#[derive(Debug, Clone)]
pub struct GeodesicMask {
    mask: Array2<bool>,
}

impl GeodesicMask {
    /// Compute the mask over longitude/latitude meshes given in degrees.
    pub fn compute(
        lons: &Array2<f64>,
        lats: &Array2<f64>,
        center: (f64, f64),
        diameter_km: f64,
        radius_km: f64,
    ) -> FieldResult<Self> {
        if lons.dim() != lats.dim() {
            return Err(FieldError::shape_mismatch(format!(
                "longitude mesh {:?} and latitude mesh {:?} differ",
                lons.dim(),
                lats.dim()
            )));
        }

        let half = diameter_km / 2.0;
        let mut mask = Array2::from_elem(lons.dim(), false);
        Zip::from(&mut mask)
            .and(lons)
            .and(lats)
            .for_each(|m, &lon, &lat| {
                *m = haversine_km(lon, lat, center.0, center.1, radius_km) > half;
            });

        Ok(Self { mask })
    }

    /// The raw mask, `true` outside the circle.
    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// Number of points inside the circle.
    pub fn retained(&self) -> usize {
        self.mask.iter().filter(|&&m| !m).count()
    }

    pub fn is_empty(&self) -> bool {
        self.retained() == 0
    }

    /// Values of `mesh` at retained points.
    pub fn retained_values<'a>(&'a self, mesh: &'a Array2<f64>) -> impl Iterator<Item = f64> + 'a {
        self.mask
            .iter()
            .zip(mesh.iter())
            .filter(|(&m, _)| !m)
            .map(|(_, &v)| v)
    }
}
