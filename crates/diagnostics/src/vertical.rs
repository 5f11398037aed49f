//! Vertical integrals over model levels.

use ndarray::{ArrayD, Axis};

use field_common::{Field, FieldError};

use crate::error::{DiagnosticsError, Result};

/// Names tried, in order, for the vertical coordinate.
pub const DEFAULT_Z_NAMES: &[&str] = &["altitude", "height_above_reference_ellipsoid"];

/// Thickness of every grid box of `field`, from the bounds of its vertical
/// coordinate.
///
/// The vertical coordinate is the first of `z_names` the field carries; bounds
/// are inferred from the level midpoints when the coordinate has none. The
/// result has the shape of `field`, with the thickness of each level repeated
/// along the other dimensions.
pub fn layer_thickness(field: &Field, z_names: &[&str]) -> Result<Field> {
    let (z_dim, z) = field.coord_any(z_names)?;
    let z = z.with_guessed_bounds()?;
    let widths: Vec<f32> = z
        .cell_widths()
        .ok_or_else(|| FieldError::bounds_inference(z.name(), "coordinate has no bounds"))?
        .iter()
        .map(|w| w.abs() as f32)
        .collect();
    let units = z.units().unwrap_or("m").to_string();

    let data = ArrayD::from_shape_fn(field.data().raw_dim(), |ix| widths[ix[z_dim]]);
    Ok(field
        .with_data(data, vec![(z_dim, z)])?
        .renamed("layer_thickness")
        .with_units(units))
}

/// Mass-weighted vertical sum `Σ q·ρ·Δz`, removing the vertical dimension.
///
/// `q` and `rho` must share a shape and carry the vertical coordinate on the
/// same dimension. Missing values propagate into the column total.
pub fn column_integral(q: &Field, rho: &Field, z_names: &[&str]) -> Result<Field> {
    if q.shape() != rho.shape() {
        return Err(DiagnosticsError::invalid_input(format!(
            "'{}' has shape {:?} but '{}' has shape {:?}",
            q.name(),
            q.shape(),
            rho.name(),
            rho.shape()
        )));
    }

    let (z_dim, _) = q.coord_any(z_names)?;
    let dz = layer_thickness(rho, z_names)?;
    let (rho_z_dim, _) = rho.coord_any(z_names)?;
    if rho_z_dim != z_dim {
        return Err(DiagnosticsError::invalid_input(format!(
            "vertical coordinate of '{}' is on dimension {} but on {} for '{}'",
            q.name(),
            z_dim,
            rho_z_dim,
            rho.name()
        )));
    }

    let mass = rho.data() * dz.data();
    let column = (q.data() * &mass).sum_axis(Axis(z_dim));
    Ok(q.with_dim_removed(z_dim, column)?)
}
