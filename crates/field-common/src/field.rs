//! Labelled multi-dimensional fields.

use ndarray::{ArrayD, Axis, IxDyn};

use crate::bbox::BoundingBox;
use crate::coord::{CoordAxis, DimCoord};
use crate::error::{FieldError, FieldResult};

/// A named numeric array with dimensional coordinates.
///
/// Each data dimension carries at most one dimensional coordinate, and each
/// of the x/y/z/t axes is described by at most one coordinate. Masked or
/// missing values are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    units: Option<String>,
    data: ArrayD<f32>,
    dim_coords: Vec<Option<DimCoord>>,
}

impl Field {
    /// Create a field from its data and `(coordinate, dimension)` pairs.
    pub fn new(
        name: impl Into<String>,
        data: ArrayD<f32>,
        dim_coords: Vec<(DimCoord, usize)>,
    ) -> FieldResult<Self> {
        let name = name.into();
        let mut slots: Vec<Option<DimCoord>> = vec![None; data.ndim()];

        for (coord, dim) in dim_coords {
            if dim >= data.ndim() {
                return Err(FieldError::shape_mismatch(format!(
                    "coordinate '{}' attached to dimension {} of {}-dimensional field '{}'",
                    coord.name(),
                    dim,
                    data.ndim(),
                    name
                )));
            }
            if coord.len() != data.shape()[dim] {
                return Err(FieldError::shape_mismatch(format!(
                    "coordinate '{}' has {} points but dimension {} of '{}' has length {}",
                    coord.name(),
                    coord.len(),
                    dim,
                    name,
                    data.shape()[dim]
                )));
            }
            if slots[dim].is_some() {
                return Err(FieldError::InvalidCoordinate(format!(
                    "dimension {} of '{}' already has a dimensional coordinate",
                    dim, name
                )));
            }
            let duplicate_axis = coord.axis() != CoordAxis::Other
                && slots.iter().flatten().any(|c| c.axis() == coord.axis());
            let duplicate_name = slots.iter().flatten().any(|c| c.name() == coord.name());
            if duplicate_axis || duplicate_name {
                return Err(FieldError::InvalidCoordinate(format!(
                    "field '{}' already has a dimensional coordinate for '{}' ({} axis)",
                    name,
                    coord.name(),
                    coord.axis()
                )));
            }
            slots[dim] = Some(coord);
        }

        Ok(Self {
            name,
            units: None,
            data,
            dim_coords: slots,
        })
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<f32> {
        self.data
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Rename the field, keeping data and coordinates.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Iterate over `(dimension, coordinate)` for every described dimension.
    pub fn dim_coords(&self) -> impl Iterator<Item = (usize, &DimCoord)> {
        self.dim_coords
            .iter()
            .enumerate()
            .filter_map(|(dim, c)| c.as_ref().map(|c| (dim, c)))
    }

    /// Coordinate attached to a dimension, if any.
    pub fn coord_for_dim(&self, dim: usize) -> Option<&DimCoord> {
        self.dim_coords.get(dim).and_then(|c| c.as_ref())
    }

    /// Dimensional coordinate describing `axis`.
    pub fn coord_by_axis(&self, axis: CoordAxis) -> Option<(usize, &DimCoord)> {
        self.dim_coords().find(|(_, c)| c.axis() == axis)
    }

    /// Like [`Field::coord_by_axis`] but failing with a missing-coordinate error.
    pub fn require_axis(&self, axis: CoordAxis) -> FieldResult<(usize, &DimCoord)> {
        self.coord_by_axis(axis)
            .ok_or_else(|| FieldError::missing_coordinate(&self.name, &[format!("axis={}", axis)]))
    }

    /// Dimensional coordinate with exactly this name.
    pub fn coord_named(&self, name: &str) -> Option<(usize, &DimCoord)> {
        self.dim_coords().find(|(_, c)| c.name() == name)
    }

    /// Try each alternate name in turn and return the first match.
    pub fn coord_any(&self, names: &[&str]) -> FieldResult<(usize, &DimCoord)> {
        names
            .iter()
            .find_map(|name| self.coord_named(name))
            .ok_or_else(|| FieldError::missing_coordinate(&self.name, names))
    }

    /// Replace the coordinate on `dim`; the point count must not change.
    pub fn replace_coord(&mut self, dim: usize, coord: DimCoord) -> FieldResult<()> {
        if dim >= self.ndim() || coord.len() != self.shape()[dim] {
            return Err(FieldError::shape_mismatch(format!(
                "cannot attach '{}' ({} points) to dimension {} of '{}'",
                coord.name(),
                coord.len(),
                dim,
                self.name
            )));
        }
        self.dim_coords[dim] = Some(coord);
        Ok(())
    }

    /// Horizontal extent of the field's x/y point values.
    pub fn bbox(&self) -> FieldResult<BoundingBox> {
        let (_, x) = self.require_axis(CoordAxis::X)?;
        let (_, y) = self.require_axis(CoordAxis::Y)?;
        match (x.extent(), y.extent()) {
            (Some((min_x, max_x)), Some((min_y, max_y))) => {
                Ok(BoundingBox::new(min_x, min_y, max_x, max_y))
            }
            _ => Err(FieldError::InvalidCoordinate(format!(
                "field '{}' has an empty horizontal coordinate",
                self.name
            ))),
        }
    }

    /// Subset the field to the points of its x/y coordinates inside the given
    /// ranges, edges inclusive and ignoring any bounds.
    ///
    /// A circular x coordinate wraps, so the longitude range may cross the seam.
    pub fn intersection(&self, x_range: (f64, f64), y_range: (f64, f64)) -> FieldResult<Field> {
        let (x_dim, x_coord) = self.require_axis(CoordAxis::X)?;
        let (y_dim, y_coord) = self.require_axis(CoordAxis::Y)?;

        let (x_idx, new_x) = x_coord.subset_range(x_range.0, x_range.1)?;
        let (y_idx, new_y) = y_coord.subset_range(y_range.0, y_range.1)?;

        let data = self
            .data
            .select(Axis(x_dim), &x_idx)
            .select(Axis(y_dim), &y_idx);

        let mut dim_coords = self.dim_coords.clone();
        dim_coords[x_dim] = Some(new_x);
        dim_coords[y_dim] = Some(new_y);

        Ok(Field {
            name: self.name.clone(),
            units: self.units.clone(),
            data,
            dim_coords,
        })
    }

    /// Field of the same name whose data has been replaced, with new coordinates
    /// for the given dimensions. Used by operations that reshape data.
    pub fn with_data(
        &self,
        data: ArrayD<f32>,
        replaced: Vec<(usize, DimCoord)>,
    ) -> FieldResult<Field> {
        if data.ndim() != self.ndim() {
            return Err(FieldError::shape_mismatch(format!(
                "new data for '{}' has {} dimensions, expected {}",
                self.name,
                data.ndim(),
                self.ndim()
            )));
        }
        let mut dim_coords = self.dim_coords.clone();
        for (dim, coord) in replaced {
            dim_coords[dim] = Some(coord);
        }
        for (dim, coord) in dim_coords.iter().enumerate() {
            if let Some(coord) = coord {
                if coord.len() != data.shape()[dim] {
                    return Err(FieldError::shape_mismatch(format!(
                        "coordinate '{}' has {} points but dimension {} of '{}' has length {}",
                        coord.name(),
                        coord.len(),
                        dim,
                        self.name,
                        data.shape()[dim]
                    )));
                }
            }
        }
        Ok(Field {
            name: self.name.clone(),
            units: self.units.clone(),
            data,
            dim_coords,
        })
    }

    /// Field with dimension `dim` removed, keeping the remaining coordinates.
    pub fn with_dim_removed(&self, dim: usize, data: ArrayD<f32>) -> FieldResult<Field> {
        if dim >= self.ndim() || data.ndim() + 1 != self.ndim() {
            return Err(FieldError::shape_mismatch(format!(
                "cannot remove dimension {} from '{}'",
                dim, self.name
            )));
        }
        let mut dim_coords = self.dim_coords.clone();
        dim_coords.remove(dim);
        for (d, coord) in dim_coords.iter().enumerate() {
            if let Some(coord) = coord {
                if coord.len() != data.shape()[d] {
                    return Err(FieldError::shape_mismatch(format!(
                        "reduced data for '{}' does not match coordinate '{}'",
                        self.name,
                        coord.name()
                    )));
                }
            }
        }
        Ok(Field {
            name: self.name.clone(),
            units: self.units.clone(),
            data,
            dim_coords,
        })
    }

    /// Zero-filled two-dimensional field on the given y/x coordinates.
    pub fn zeros_2d(name: impl Into<String>, y: DimCoord, x: DimCoord) -> FieldResult<Field> {
        let data = ArrayD::zeros(IxDyn(&[y.len(), x.len()]));
        Field::new(name, data, vec![(y, 0), (x, 1)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lon_lat_field() -> Field {
        let x = DimCoord::new("longitude", CoordAxis::X, vec![0.0, 1.0, 2.0, 3.0]);
        let y = DimCoord::new("latitude", CoordAxis::Y, vec![10.0, 11.0, 12.0]);
        let data = ArrayD::from_shape_fn(IxDyn(&[3, 4]), |ix| (ix[0] * 10 + ix[1]) as f32);
        Field::new("test", data, vec![(y, 0), (x, 1)]).unwrap()
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let x = DimCoord::new("longitude", CoordAxis::X, vec![0.0, 1.0]);
        let data = ArrayD::zeros(IxDyn(&[3]));
        assert!(matches!(
            Field::new("bad", data, vec![(x, 0)]),
            Err(FieldError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_new_rejects_duplicate_axis() {
        let x1 = DimCoord::new("longitude", CoordAxis::X, vec![0.0, 1.0]);
        let x2 = DimCoord::new("grid_longitude", CoordAxis::X, vec![0.0, 1.0]);
        let data = ArrayD::zeros(IxDyn(&[2, 2]));
        assert!(Field::new("bad", data, vec![(x1, 0), (x2, 1)]).is_err());
    }

    #[test]
    fn test_coord_any_tries_alternates() {
        let z = DimCoord::new("height_above_reference_ellipsoid", CoordAxis::Z, vec![0.0, 1.0]);
        let data = ArrayD::zeros(IxDyn(&[2]));
        let field = Field::new("rho", data, vec![(z, 0)]).unwrap();

        let (dim, coord) = field
            .coord_any(&["altitude", "height_above_reference_ellipsoid"])
            .unwrap();
        assert_eq!(dim, 0);
        assert_eq!(coord.name(), "height_above_reference_ellipsoid");

        match field.coord_any(&["altitude", "model_level_number"]) {
            Err(FieldError::MissingCoordinate { field, names }) => {
                assert_eq!(field, "rho");
                assert_eq!(names.len(), 2);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_intersection_subsets_data() {
        let field = lon_lat_field();
        let sub = field.intersection((1.0, 2.0), (11.0, 12.0)).unwrap();

        assert_eq!(sub.shape(), &[2, 2]);
        assert_eq!(sub.data()[[0, 0]], 11.0);
        assert_eq!(sub.data()[[1, 1]], 22.0);
        assert_eq!(sub.bbox().unwrap(), BoundingBox::new(1.0, 11.0, 2.0, 12.0));
    }

    #[test]
    fn test_zeros_2d() {
        let y = DimCoord::new("latitude", CoordAxis::Y, vec![0.0, 1.0]);
        let x = DimCoord::new("longitude", CoordAxis::X, vec![0.0, 1.0, 2.0]);
        let field = Field::zeros_2d("grid", y, x).unwrap();
        assert_eq!(field.shape(), &[2, 3]);
        assert!(field.data().iter().all(|&v| v == 0.0));
    }
}
