//! Zarr V3 persistence for field collections.
//!
//! Each forecast lead time, and each regridded output frame, is one Zarr
//! hierarchy on the local filesystem:
//!
//! ```text
//! 20200201T0000_km1p1_T+01_lagrangian_grid.zarr/
//! ├── zarr.json                 root group: field names + collection metadata
//! ├── air_temperature/zarr.json array metadata: units, dimensional coordinates
//! └── air_temperature/c/...     Float32 chunks, NaN fill
//! ```
//!
//! [`ZarrForecast`] reads a forecast lazily, one hierarchy per lead time, and
//! implements [`field_common::ForecastSource`].

pub mod config;
pub mod error;
pub mod forecast;
pub mod naming;
pub mod reader;
pub mod writer;

pub use config::{ForecastConfig, StoreConfig, ZarrCompression};
pub use error::{Result, StoreError};
pub use forecast::ZarrForecast;
pub use naming::{forecast_path, output_path};
pub use reader::{load_grid, read_collection, ZarrFieldReader};
pub use writer::{CollectionMetadata, WriteSummary, ZarrFieldWriter};
