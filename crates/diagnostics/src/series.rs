//! Time series operations on diagnostic fields.

use ndarray::{Axis, Slice};

use field_common::{CoordAxis, Field, FieldError};

use crate::error::{DiagnosticsError, Result};

/// Change between consecutive times, `x[1:] - x[:-1]`.
///
/// The result is one time shorter than `field` and carries the later time of
/// each pair.
pub fn time_tendency(field: &Field) -> Result<Field> {
    let (t_dim, t) = field.require_axis(CoordAxis::T)?;
    let n = t.len();
    if n < 2 {
        return Err(DiagnosticsError::invalid_input(format!(
            "'{}' needs at least 2 times for a tendency, found {}",
            field.name(),
            n
        )));
    }

    let later = field.data().slice_axis(Axis(t_dim), Slice::from(1..n));
    let earlier = field.data().slice_axis(Axis(t_dim), Slice::from(0..n - 1));
    let diff = &later - &earlier;

    let indices: Vec<usize> = (1..n).collect();
    let times = t.select(&indices)?;
    Ok(field.with_data(diff, vec![(t_dim, times)])?)
}

/// Restrict `field` to times in `[start, end]`, edges inclusive.
pub fn time_window(field: &Field, start: f64, end: f64) -> Result<Field> {
    let (t_dim, t) = field.require_axis(CoordAxis::T)?;
    let (indices, times) = t.subset_range(start, end)?;
    let data = field.data().select(Axis(t_dim), &indices);
    Ok(field.with_data(data, vec![(t_dim, times)])?)
}

/// One sub-field per point of the named coordinate, with that dimension
/// removed, paired with the point value.
pub fn slices_over(field: &Field, coord_name: &str) -> Result<Vec<(f64, Field)>> {
    let (dim, coord) = field
        .coord_named(coord_name)
        .ok_or_else(|| FieldError::missing_coordinate(field.name(), &[coord_name]))?;

    coord
        .points()
        .iter()
        .enumerate()
        .map(|(i, &point)| {
            let data = field.data().index_axis(Axis(dim), i).to_owned();
            Ok((point, field.with_dim_removed(dim, data)?))
        })
        .collect()
}

/// `field` with every value negated.
pub fn negated(field: &Field) -> Result<Field> {
    Ok(field.with_data(field.data().mapv(|v| -v), Vec::new())?)
}
