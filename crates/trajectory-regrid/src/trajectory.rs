//! Air-parcel trajectories.
//!
//! A trajectory is loaded once from a JSON document of the form
//!
//! ```json
//! {"points": [{"time": "2020-02-01T01:00:00Z", "positions": [[-54.0, 13.2]]}]}
//! ```
//!
//! where each entry holds the `(longitude, latitude)` of every parcel at one
//! time. Only the first parcel is followed.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RegridError, Result};

/// One time of a serialized trajectory ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub time: DateTime<Utc>,
    /// `[longitude, latitude]` per parcel.
    pub positions: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrajectoryFile {
    points: Vec<TrajectoryPoint>,
}

/// Parcel positions indexed by exact time.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    positions: BTreeMap<DateTime<Utc>, Vec<[f64; 2]>>,
}

impl Trajectory {
    /// Build from points; times must be unique and every time must hold at
    /// least one finite position.
    pub fn from_points(points: impl IntoIterator<Item = TrajectoryPoint>) -> Result<Self> {
        let mut positions = BTreeMap::new();
        for point in points {
            if point.positions.is_empty() {
                return Err(RegridError::invalid_trajectory(format!(
                    "no parcel positions at {}",
                    point.time
                )));
            }
            if point
                .positions
                .iter()
                .flatten()
                .any(|v| !v.is_finite())
            {
                return Err(RegridError::invalid_trajectory(format!(
                    "non-finite position at {}",
                    point.time
                )));
            }
            if positions.insert(point.time, point.positions).is_some() {
                return Err(RegridError::invalid_trajectory(format!(
                    "duplicate time {}",
                    point.time
                )));
            }
        }
        Ok(Self { positions })
    }

    /// Trajectory of a single parcel.
    pub fn single(points: impl IntoIterator<Item = (DateTime<Utc>, (f64, f64))>) -> Result<Self> {
        Self::from_points(points.into_iter().map(|(time, (lon, lat))| TrajectoryPoint {
            time,
            positions: vec![[lon, lat]],
        }))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: TrajectoryFile = serde_json::from_str(json)?;
        Self::from_points(file.points)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let trajectory = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            times = trajectory.len(),
            "Loaded trajectory"
        );
        Ok(trajectory)
    }

    /// Serialize back to the JSON document format.
    pub fn to_json_string(&self) -> Result<String> {
        let file = TrajectoryFile {
            points: self
                .positions
                .iter()
                .map(|(time, positions)| TrajectoryPoint {
                    time: *time,
                    positions: positions.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// `(longitude, latitude)` of the first parcel at exactly `time`.
    pub fn position_at(&self, time: DateTime<Utc>) -> Result<(f64, f64)> {
        self.positions
            .get(&time)
            .and_then(|p| p.first())
            .map(|&[lon, lat]| (lon, lat))
            .ok_or(RegridError::TrajectoryTime(time))
    }

    pub fn times(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.positions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
