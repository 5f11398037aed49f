//! Common types shared across the trajectory regridding crates.
//!
//! A [`Field`] is a labelled n-dimensional array with dimensional coordinates
//! attached to some of its dimensions. Fields produced for one forecast lead
//! time are grouped in a [`FieldCollection`]. A [`Grid`] carries only the
//! horizontal coordinates used as a regridding target.

pub mod bbox;
pub mod collection;
pub mod coord;
pub mod error;
pub mod field;
pub mod forecast;
pub mod grid;
pub mod time;

pub use bbox::BoundingBox;
pub use collection::FieldCollection;
pub use coord::{CoordAxis, DimCoord};
pub use error::{FieldError, FieldResult};
pub use field::Field;
pub use forecast::{ForecastSource, ForecastStep};
pub use grid::Grid;
pub use time::{lead_hours, parse_forecast_start};
