//! Diagnostics derived from regridded trajectory output.
//!
//! - [`vertical`]: layer thickness and mass-weighted column integrals
//! - [`series`]: time tendencies, time windows and per-quantile slices
//! - [`budget`]: the column water budget of moisture tracers
//! - [`style`]: line styles and labels per simulation resolution

pub mod budget;
pub mod error;
pub mod series;
pub mod style;
pub mod vertical;

pub use budget::{
    column_budget, BudgetOptions, ColumnBudget, QuantileSeries, TermBudget, BUDGET_TERMS,
    DENSITY_FIELD, MEAN_SUFFIX,
};
pub use error::{DiagnosticsError, Result};
pub use series::{negated, slices_over, time_tendency, time_window};
pub use style::PresentationStyle;
pub use vertical::{column_integral, layer_thickness, DEFAULT_Z_NAMES};
