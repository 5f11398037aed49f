//! Moving sub-grid extraction along an air-parcel trajectory.
//!
//! Given a forecast defined on a large longitude/latitude grid and a
//! trajectory through that domain, this crate builds a small window around
//! the trajectory start and regrids every forecast field onto that window,
//! translated to follow the trajectory, one lead time at a time.
//!
//! # Architecture
//!
//! ```text
//! ForecastSource ──► TrajectoryFollower ──► RegriddedFrame (one per lead time)
//!                        │
//!                        ├─► GridBuilder       (first frame: circle → box)
//!                        │      └─► GeodesicMask
//!                        ├─► GridTranslator    (every frame: rigid shift)
//!                        └─► ConservativeRegridder (area-weighted)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use trajectory_regrid::{RegridConfig, Trajectory, TrajectoryFollower, Window};
//!
//! let trajectory = Trajectory::from_json_file("trajectory.json")?;
//! let follower = TrajectoryFollower::new(forecast, trajectory, Window::Diameter(200.0), &RegridConfig::default())?;
//! for frame in follower {
//!     let frame = frame?;
//!     // persist frame.fields
//! }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod follower;
pub mod geodesic;
pub mod regrid;
pub mod trajectory;
pub mod translate;

pub use builder::GridBuilder;
pub use config::{EmptySelectionPolicy, RegridConfig, DEFAULT_EARTH_RADIUS_KM, DEFAULT_REFERENCE_FIELD};
pub use error::{RegridError, Result};
pub use follower::{RegriddedFrame, TrajectoryFollower, Window};
pub use geodesic::{haversine_km, meshgrid, GeodesicMask};
pub use regrid::{area_integral, AreaWeights, ConservativeRegridder};
pub use trajectory::{Trajectory, TrajectoryPoint};
pub use translate::{translate, GridTranslator};
