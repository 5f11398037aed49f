//! Horizontal regridding targets.

use crate::bbox::BoundingBox;
use crate::coord::{CoordAxis, DimCoord};
use crate::error::{FieldError, FieldResult};
use crate::field::Field;

/// A rectilinear horizontal grid: a y coordinate and an x coordinate.
///
/// Grids are values. Moving a grid produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    y: DimCoord,
    x: DimCoord,
}

impl Grid {
    pub fn new(y: DimCoord, x: DimCoord) -> FieldResult<Self> {
        if y.axis() != CoordAxis::Y || x.axis() != CoordAxis::X {
            return Err(FieldError::InvalidCoordinate(format!(
                "grid needs y and x coordinates, got {} ({}) and {} ({})",
                y.name(),
                y.axis(),
                x.name(),
                x.axis()
            )));
        }
        Ok(Self { y, x })
    }

    /// Take the x/y dimensional coordinates of a field.
    pub fn from_field(field: &Field) -> FieldResult<Self> {
        let (_, x) = field.require_axis(CoordAxis::X)?;
        let (_, y) = field.require_axis(CoordAxis::Y)?;
        Self::new(y.clone(), x.clone())
    }

    pub fn x(&self) -> &DimCoord {
        &self.x
    }

    pub fn y(&self) -> &DimCoord {
        &self.y
    }

    /// Number of points as (ny, nx).
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }

    /// Mean of the x and y point values.
    pub fn centroid(&self) -> (f64, f64) {
        (self.x.mean(), self.y.mean())
    }

    pub fn has_bounds(&self) -> bool {
        self.x.has_bounds() && self.y.has_bounds()
    }

    /// Copy whose coordinates carry bounds, inferring any that are missing.
    pub fn with_guessed_bounds(&self) -> FieldResult<Self> {
        Ok(Self {
            y: self.y.with_guessed_bounds()?,
            x: self.x.with_guessed_bounds()?,
        })
    }

    /// Extent of the point values.
    pub fn bbox(&self) -> FieldResult<BoundingBox> {
        match (self.x.extent(), self.y.extent()) {
            (Some((min_x, max_x)), Some((min_y, max_y))) => {
                Ok(BoundingBox::new(min_x, min_y, max_x, max_y))
            }
            _ => Err(FieldError::InvalidCoordinate("grid is empty".to_string())),
        }
    }

    /// Zero-filled field carrying this grid.
    pub fn to_field(&self, name: impl Into<String>) -> FieldResult<Field> {
        Field::zeros_2d(name, self.y.clone(), self.x.clone())
    }
}
