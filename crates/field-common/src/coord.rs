//! Dimensional coordinates.
//!
//! A [`DimCoord`] names one dimension of a field, gives the value of every
//! point along it, and optionally the lower/upper edge of the cell each point
//! represents. Conservative regridding needs those edges, so coordinates
//! without bounds can infer them from point spacing with [`DimCoord::guess_bounds`].

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};

/// Period of a cyclic longitude coordinate, in degrees.
pub const LONGITUDE_PERIOD: f64 = 360.0;

/// Relative tolerance used when matching coordinate values against a range.
const RANGE_TOLERANCE: f64 = 1e-9;

/// Axis a dimensional coordinate describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordAxis {
    X,
    Y,
    Z,
    T,
    /// Any other dimension (ensemble member, quantile, ...).
    Other,
}

impl CoordAxis {
    /// Get the axis name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::T => "t",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for CoordAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named, ordered, one-dimensional coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimCoord {
    name: String,
    axis: CoordAxis,
    points: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bounds: Option<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    units: Option<String>,
    #[serde(default)]
    circular: bool,
}

impl DimCoord {
    /// Create a coordinate without bounds.
    pub fn new(name: impl Into<String>, axis: CoordAxis, points: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            axis,
            points,
            bounds: None,
            units: None,
            circular: false,
        }
    }

    /// Attach bounds, one `[lower, upper]` pair per point.
    pub fn with_bounds(mut self, bounds: Vec<[f64; 2]>) -> FieldResult<Self> {
        if bounds.len() != self.points.len() {
            return Err(FieldError::shape_mismatch(format!(
                "coordinate '{}' has {} points but {} bounds",
                self.name,
                self.points.len(),
                bounds.len()
            )));
        }
        self.bounds = Some(bounds);
        Ok(self)
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Mark the coordinate as cyclic (longitude wrapping every 360 degrees).
    pub fn with_circular(mut self, circular: bool) -> Self {
        self.circular = circular;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axis(&self) -> CoordAxis {
        self.axis
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn bounds(&self) -> Option<&[[f64; 2]]> {
        self.bounds.as_deref()
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn is_circular(&self) -> bool {
        self.circular
    }

    pub fn has_bounds(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mean of the point values, or NaN for an empty coordinate.
    pub fn mean(&self) -> f64 {
        if self.points.is_empty() {
            return f64::NAN;
        }
        self.points.iter().sum::<f64>() / self.points.len() as f64
    }

    /// Smallest and largest point value.
    pub fn extent(&self) -> Option<(f64, f64)> {
        let mut iter = self.points.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Smallest and largest cell edge, if bounds are present.
    pub fn bounds_extent(&self) -> Option<(f64, f64)> {
        let bounds = self.bounds.as_ref()?;
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for [a, b] in bounds {
            lo = lo.min(a.min(*b));
            hi = hi.max(a.max(*b));
        }
        if bounds.is_empty() {
            None
        } else {
            Some((lo, hi))
        }
    }

    /// True when consecutive points are all increasing or all decreasing.
    pub fn is_strictly_monotonic(&self) -> bool {
        if self.points.len() < 2 {
            return true;
        }
        let increasing = self.points.windows(2).all(|w| w[1] > w[0]);
        let decreasing = self.points.windows(2).all(|w| w[1] < w[0]);
        increasing || decreasing
    }

    /// Infer bounds at the midpoints between neighbouring points.
    ///
    /// The outermost cells extend by half the spacing of their single
    /// neighbour. Requires at least two strictly monotonic points.
    pub fn guess_bounds(&mut self) -> FieldResult<()> {
        if self.bounds.is_some() {
            return Err(FieldError::bounds_inference(
                &self.name,
                "coordinate already has bounds",
            ));
        }
        if self.points.len() < 2 {
            return Err(FieldError::bounds_inference(
                &self.name,
                format!("need at least 2 points, found {}", self.points.len()),
            ));
        }
        if self.points.iter().any(|p| !p.is_finite()) {
            return Err(FieldError::bounds_inference(
                &self.name,
                "points contain non-finite values",
            ));
        }
        if !self.is_strictly_monotonic() {
            return Err(FieldError::bounds_inference(
                &self.name,
                "points are not strictly monotonic",
            ));
        }

        let n = self.points.len();
        let diffs: Vec<f64> = self.points.windows(2).map(|w| w[1] - w[0]).collect();
        let bounds = (0..n)
            .map(|i| {
                let before = if i == 0 { diffs[0] } else { diffs[i - 1] };
                let after = if i == n - 1 { diffs[n - 2] } else { diffs[i] };
                let p = self.points[i];
                [p - before / 2.0, p + after / 2.0]
            })
            .collect();

        self.bounds = Some(bounds);
        Ok(())
    }

    /// Copy of this coordinate guaranteed to carry bounds.
    pub fn with_guessed_bounds(&self) -> FieldResult<Self> {
        let mut coord = self.clone();
        if !coord.has_bounds() {
            coord.guess_bounds()?;
        }
        Ok(coord)
    }

    /// Copy with every point and bound moved by `offset`.
    ///
    /// Fails with a bounds error when the coordinate has no bounds and none
    /// can be inferred.
    pub fn shifted(&self, offset: f64) -> FieldResult<Self> {
        let mut coord = self.with_guessed_bounds()?;
        for p in &mut coord.points {
            *p += offset;
        }
        if let Some(bounds) = coord.bounds.as_mut() {
            for [lo, hi] in bounds.iter_mut() {
                *lo += offset;
                *hi += offset;
            }
        }
        Ok(coord)
    }

    /// Spacing recovered from bounds (upper minus lower edge of each cell).
    pub fn cell_widths(&self) -> Option<Vec<f64>> {
        self.bounds
            .as_ref()
            .map(|b| b.iter().map(|[lo, hi]| hi - lo).collect())
    }

    /// Select points lying in `[min, max]`, edges inclusive, ignoring bounds.
    ///
    /// Returns the selected source indices together with the coordinate made
    /// of those points. For a circular coordinate each point is first moved by
    /// a whole number of periods into `[min, min + 360)`, so a range crossing
    /// the seam selects points from both ends and the result is reordered to
    /// stay monotonic.
    pub fn subset_range(&self, min: f64, max: f64) -> FieldResult<(Vec<usize>, Self)> {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let tol = RANGE_TOLERANCE * (1.0 + min.abs().max(max.abs()));

        let mut selected: Vec<(usize, f64)> = if self.circular {
            self.points
                .iter()
                .enumerate()
                .filter_map(|(i, &p)| {
                    let wrapped = min + (p - min + tol).rem_euclid(LONGITUDE_PERIOD) - tol;
                    // Whole periods only, so unshifted points keep their exact value.
                    let shift = ((wrapped - p) / LONGITUDE_PERIOD).round() * LONGITUDE_PERIOD;
                    (p + shift <= max + tol).then_some((i, shift))
                })
                .collect()
        } else {
            self.points
                .iter()
                .enumerate()
                .filter(|(_, &p)| p >= min - tol && p <= max + tol)
                .map(|(i, _)| (i, 0.0))
                .collect()
        };

        if selected.is_empty() {
            return Err(FieldError::EmptySelection {
                coord: self.name.clone(),
                min,
                max,
            });
        }

        if self.circular {
            let ascending = self.points.len() < 2 || self.points[1] >= self.points[0];
            selected.sort_by(|a, b| {
                let va = self.points[a.0] + a.1;
                let vb = self.points[b.0] + b.1;
                let ord = va.total_cmp(&vb);
                if ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        let indices: Vec<usize> = selected.iter().map(|(i, _)| *i).collect();
        let points = selected
            .iter()
            .map(|&(i, shift)| self.points[i] + shift)
            .collect();
        let bounds = self.bounds.as_ref().map(|b| {
            selected
                .iter()
                .map(|&(i, shift)| [b[i][0] + shift, b[i][1] + shift])
                .collect()
        });

        Ok((
            indices,
            Self {
                name: self.name.clone(),
                axis: self.axis,
                points,
                bounds,
                units: self.units.clone(),
                circular: self.circular,
            },
        ))
    }

    /// Coordinate made of the points at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> FieldResult<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.points.len()) {
            return Err(FieldError::InvalidCoordinate(format!(
                "index {} out of range for coordinate '{}' of length {}",
                bad,
                self.name,
                self.points.len()
            )));
        }
        Ok(Self {
            name: self.name.clone(),
            axis: self.axis,
            points: indices.iter().map(|&i| self.points[i]).collect(),
            bounds: self
                .bounds
                .as_ref()
                .map(|b| indices.iter().map(|&i| b[i]).collect()),
            units: self.units.clone(),
            circular: self.circular,
        })
    }
}
