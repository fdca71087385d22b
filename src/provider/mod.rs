//! External routing providers.
//!
//! Two services sit behind traits so the pipeline can be driven by the
//! Mapbox HTTP client in production and by in-memory fakes in tests:
//! - [`TravelCostProvider`]: one full pairwise duration matrix per waypoint set
//! - [`DirectionsProvider`]: one route geometry per bounded batch of waypoints

pub mod mapbox;

use geojson::Feature;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matrix::CostMatrix;
use crate::waypoint::Waypoint;

pub use mapbox::{MapboxClient, MapboxConfig};

/// Travel profile understood by the providers
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    #[default]
    Driving,
    DrivingTraffic,
    Walking,
    Cycling,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Driving => "driving",
            Profile::DrivingTraffic => "driving-traffic",
            Profile::Walking => "walking",
            Profile::Cycling => "cycling",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of pairwise travel durations.
///
/// Implementers return a square matrix sized like `waypoints`, where entry
/// `(i, j)` is the duration from `waypoints[i]` to `waypoints[j]`.
#[allow(async_fn_in_trait)]
pub trait TravelCostProvider {
    async fn durations(&self, waypoints: &[Waypoint], profile: Profile) -> Result<CostMatrix>;
}

/// Source of route geometry along an ordered list of waypoints.
///
/// Implementers return a single LineString feature following the waypoints
/// in the given order.
#[allow(async_fn_in_trait)]
pub trait DirectionsProvider {
    /// Largest number of waypoints accepted in one request
    fn max_waypoints(&self) -> usize;

    async fn route(&self, waypoints: &[Waypoint], profile: Profile) -> Result<Feature>;
}
