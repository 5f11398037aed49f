//! Rigid translation of a grid.

use field_common::{DimCoord, Grid};

use crate::error::Result;

/// Shift a grid's x/y points and bounds by `(dx, dy)`.
///
/// Point count, ordering and spacing are unchanged. Coordinates without
/// bounds get them inferred first; a coordinate whose bounds cannot be
/// inferred is an error.
pub fn translate(x: &DimCoord, y: &DimCoord, dx: f64, dy: f64) -> Result<Grid> {
    let x = x.shifted(dx)?;
    let y = y.shifted(dy)?;
    Ok(Grid::new(y, x)?)
}

/// Translates a fixed reference grid relative to its reference centre.
///
/// Every call starts from the untranslated coordinates, so offsets never
/// accumulate across frames.
#[derive(Debug, Clone)]
pub struct GridTranslator {
    base: Grid,
    center: (f64, f64),
}

impl GridTranslator {
    /// `base` must already carry bounds or be able to infer them.
    pub fn new(base: &Grid, center: (f64, f64)) -> Result<Self> {
        Ok(Self {
            base: base.with_guessed_bounds()?,
            center,
        })
    }

    pub fn base(&self) -> &Grid {
        &self.base
    }

    /// Reference centre `(x0, y0)`.
    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    /// Offset of `position` from the reference centre.
    pub fn offset(&self, position: (f64, f64)) -> (f64, f64) {
        (position.0 - self.center.0, position.1 - self.center.1)
    }

    /// Grid moved so that its reference centre lies at `position`.
    pub fn translate_to(&self, position: (f64, f64)) -> Result<Grid> {
        let (dx, dy) = self.offset(position);
        translate(self.base.x(), self.base.y(), dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegridError;
    use field_common::{CoordAxis, FieldError};
    use test_utils::{assert_points_approx_eq, lat_coord, lon_coord};

    fn base() -> Grid {
        Grid::new(
            lat_coord(vec![1.0, 2.0, 3.0]),
            lon_coord(vec![1.0, 2.0, 3.0]),
        )
        .unwrap()
    }

    #[test]
    fn test_translate_shifts_points_and_bounds() {
        let grid = base();
        let moved = translate(grid.x(), grid.y(), 0.5, -0.25).unwrap();

        assert_points_approx_eq!(moved.x().points(), &[1.5, 2.5, 3.5], 1e-12);
        assert_points_approx_eq!(moved.y().points(), &[0.75, 1.75, 2.75], 1e-12);
        assert_eq!(moved.x().bounds().unwrap()[0], [1.0, 2.0]);
        assert_eq!(moved.shape(), grid.shape());
    }

    #[test]
    fn test_translate_fails_without_inferable_bounds() {
        let x = DimCoord::new("longitude", CoordAxis::X, vec![2.0]);
        let y = lat_coord(vec![1.0, 2.0]);
        let err = translate(&x, &y, 1.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            RegridError::Field(FieldError::BoundsInference { .. })
        ));
    }

    #[test]
    fn test_translator_does_not_accumulate() {
        let translator = GridTranslator::new(&base(), (2.0, 2.0)).unwrap();

        let mut last = None;
        for step in 0..100 {
            let lon = 2.0 + 0.1 * step as f64;
            last = Some(translator.translate_to((lon, 2.0)).unwrap());
        }
        let last = last.unwrap();
        let expected_dx = 0.1 * 99.0;
        assert_points_approx_eq!(
            last.x().points(),
            &[1.0 + expected_dx, 2.0 + expected_dx, 3.0 + expected_dx],
            1e-9
        );
        assert_eq!(translator.base().x().points(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_translate_to_center_is_identity() {
        let translator = GridTranslator::new(&base(), (2.0, 2.0)).unwrap();
        let grid = translator.translate_to((2.0, 2.0)).unwrap();
        assert_eq!(&grid, translator.base());
    }
}
