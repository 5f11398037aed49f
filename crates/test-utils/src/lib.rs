//! Shared test utilities for the trajectory regridding workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic longitude/latitude fields and coordinates
//! - An in-memory forecast source
//! - Fixed scenarios used across crates
//! - Approximate equality macros
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod forecast;
pub mod generators;

pub use fixtures::*;
pub use forecast::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Element-wise approximate equality of two `f64` slices.
///
/// ```ignore
/// use test_utils::assert_points_approx_eq;
///
/// assert_points_approx_eq!(&[1.0, 2.0], &[1.0, 2.0 + 1e-12], 1e-9);
/// ```
#[macro_export]
macro_rules! assert_points_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: &[f64] = $left;
        let right: &[f64] = $right;
        assert_eq!(
            left.len(),
            right.len(),
            "length mismatch: {:?} vs {:?}",
            left,
            right
        );
        for (l, r) in left.iter().zip(right.iter()) {
            $crate::assert_approx_eq!(*l, *r, $epsilon);
        }
    }};
}
