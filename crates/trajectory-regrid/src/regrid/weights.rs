//! Area weights for conservative regridding between rectilinear grids.
//!
//! Cells are spherical rectangles, so the overlap area of a source and a
//! target cell factors into a longitude part (the overlap width in radians)
//! and a latitude part (the difference of the sines of the overlap edges).
//! Weights are therefore computed once per axis and combined per cell.

use field_common::coord::LONGITUDE_PERIOD;
use field_common::{DimCoord, FieldError, FieldResult};

/// Relative slack when comparing covered area against the cell area.
const COVERAGE_TOLERANCE: f64 = 1e-9;

/// How an axis measures the length of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    /// Longitude: interval width in radians.
    Longitude,
    /// Latitude: difference of sines, edges clamped to the poles.
    Latitude,
}

impl AxisKind {
    /// Measure of `[lo, hi]` along this axis.
    pub fn measure(self, lo: f64, hi: f64) -> f64 {
        match self {
            Self::Longitude => (hi - lo).to_radians(),
            Self::Latitude => {
                let lo = lo.clamp(-90.0, 90.0).to_radians();
                let hi = hi.clamp(-90.0, 90.0).to_radians();
                hi.sin() - lo.sin()
            }
        }
    }
}

/// Overlap weights of every source cell for each target cell along one axis.
#[derive(Debug, Clone)]
pub struct AxisWeights {
    /// `(source index, overlap measure)` pairs per target cell.
    overlaps: Vec<Vec<(usize, f64)>>,
    /// Measure of each whole target cell.
    target_measure: Vec<f64>,
}

impl AxisWeights {
    /// Compute weights between two coordinates that both carry bounds.
    ///
    /// A circular source is matched against target cells shifted by a full
    /// period either way, so targets straddling the seam see both ends.
    pub fn compute(source: &DimCoord, target: &DimCoord, kind: AxisKind) -> FieldResult<Self> {
        let src_bounds = ordered_bounds(source)?;
        let tgt_bounds = ordered_bounds(target)?;

        let shifts: &[f64] = if source.is_circular() {
            &[-LONGITUDE_PERIOD, 0.0, LONGITUDE_PERIOD]
        } else {
            &[0.0]
        };

        let mut overlaps = Vec::with_capacity(tgt_bounds.len());
        let mut target_measure = Vec::with_capacity(tgt_bounds.len());

        for &(t_lo, t_hi) in &tgt_bounds {
            let mut cell = Vec::new();
            for (s, &(s_lo, s_hi)) in src_bounds.iter().enumerate() {
                let mut weight = 0.0;
                for shift in shifts {
                    let lo = t_lo.max(s_lo + shift);
                    let hi = t_hi.min(s_hi + shift);
                    if hi > lo {
                        weight += kind.measure(lo, hi);
                    }
                }
                if weight > 0.0 {
                    cell.push((s, weight));
                }
            }
            overlaps.push(cell);
            target_measure.push(kind.measure(t_lo, t_hi));
        }

        Ok(Self {
            overlaps,
            target_measure,
        })
    }

    pub fn target_len(&self) -> usize {
        self.overlaps.len()
    }

    /// Source cells overlapping target cell `t`.
    pub fn overlaps(&self, t: usize) -> &[(usize, f64)] {
        &self.overlaps[t]
    }

    pub fn target_measure(&self, t: usize) -> f64 {
        self.target_measure[t]
    }
}

/// Separable weights for a two-dimensional regrid.
#[derive(Debug, Clone)]
pub struct AreaWeights {
    y: AxisWeights,
    x: AxisWeights,
    src_nx: usize,
}

impl AreaWeights {
    pub fn compute(
        src_y: &DimCoord,
        src_x: &DimCoord,
        tgt_y: &DimCoord,
        tgt_x: &DimCoord,
    ) -> FieldResult<Self> {
        Ok(Self {
            y: AxisWeights::compute(src_y, tgt_y, AxisKind::Latitude)?,
            x: AxisWeights::compute(src_x, tgt_x, AxisKind::Longitude)?,
            src_nx: src_x.len(),
        })
    }

    /// Target shape as (ny, nx).
    pub fn target_shape(&self) -> (usize, usize) {
        (self.y.target_len(), self.x.target_len())
    }

    /// Regrid one row-major `(ny, nx)` slab.
    ///
    /// NaN source values count as missing. A target cell is NaN when the
    /// fraction of its area without valid source data exceeds `mdtol`.
    /// Returns the output slab and the number of cells masked that way.
    pub fn apply(&self, src: &[f32], mdtol: f64) -> (Vec<f32>, usize) {
        let (ny, nx) = self.target_shape();
        let mut output = vec![f32::NAN; ny * nx];
        let mut masked = 0;

        for ty in 0..ny {
            let y_measure = self.y.target_measure(ty);
            for tx in 0..nx {
                let area = y_measure * self.x.target_measure(tx);

                let mut weighted = 0.0f64;
                let mut covered = 0.0f64;
                for &(sy, wy) in self.y.overlaps(ty) {
                    let row = sy * self.src_nx;
                    for &(sx, wx) in self.x.overlaps(tx) {
                        let value = src[row + sx];
                        if value.is_nan() {
                            continue;
                        }
                        let w = wy * wx;
                        weighted += w * value as f64;
                        covered += w;
                    }
                }

                let missing = if area > 0.0 { 1.0 - covered / area } else { 1.0 };
                if covered > 0.0 && missing <= mdtol + COVERAGE_TOLERANCE {
                    output[ty * nx + tx] = (weighted / covered) as f32;
                } else {
                    masked += 1;
                }
            }
        }

        (output, masked)
    }
}

/// Bounds of a coordinate as `(lower, upper)` with lower <= upper.
fn ordered_bounds(coord: &DimCoord) -> FieldResult<Vec<(f64, f64)>> {
    let bounds = coord.bounds().ok_or_else(|| {
        FieldError::bounds_inference(coord.name(), "coordinate has no bounds")
    })?;
    Ok(bounds
        .iter()
        .map(|&[a, b]| if a <= b { (a, b) } else { (b, a) })
        .collect())
}
