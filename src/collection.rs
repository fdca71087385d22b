//! Final output assembly.
//!
//! Points and route geometry are merged into one FeatureCollection. The
//! relative order only matters to renderers that draw later features on top.

use geojson::{Feature, FeatureCollection};
use serde::{Deserialize, Serialize};

use crate::waypoint::Waypoint;

/// Which group of features comes first in the collection
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureOrder {
    #[default]
    PointsFirst,
    GeometryFirst,
}

/// Display options for the output collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Emit the waypoints themselves, in tour order
    pub include_points: bool,
    pub order: FeatureOrder,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            include_points: true,
            order: FeatureOrder::PointsFirst,
        }
    }
}

/// Merge the ordered waypoints and the route features into one collection
pub fn compose(
    ordered: Vec<Waypoint>,
    routes: Vec<Feature>,
    options: DisplayOptions,
) -> FeatureCollection {
    let points: Vec<Feature> = if options.include_points {
        ordered.into_iter().map(|w| w.feature).collect()
    } else {
        Vec::new()
    };

    let features = match options.order {
        FeatureOrder::PointsFirst => points.into_iter().chain(routes).collect(),
        FeatureOrder::GeometryFirst => routes.into_iter().chain(points).collect(),
    };

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
