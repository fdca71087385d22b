//! Waypoints and the checks applied to them before any cost is computed.
//!
//! A waypoint is a GeoJSON point feature. Its identity is its position among
//! the point features of the input; the original feature (properties, id,
//! foreign members) is carried through untouched so it can be emitted again
//! in tour order.

use geojson::{Feature, Position, Value};

use crate::error::{Result, TourError};
use crate::matrix::CostModel;

/// A tour needs at least a triangle.
pub const MIN_WAYPOINTS: usize = 3;

/// A point to be visited
#[derive(Debug, Clone)]
pub struct Waypoint {
    /// Index among the point features of the input (0-based)
    pub index: usize,
    /// Full coordinate as read, including any altitude
    pub position: Position,
    /// The original feature
    pub feature: Feature,
}

impl Waypoint {
    /// Wrap `feature` if it carries a point geometry with at least two ordinates.
    pub fn from_feature(index: usize, feature: Feature) -> Option<Self> {
        let position = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Point(position)) if position.len() >= 2 => position.clone(),
            _ => return None,
        };
        Some(Waypoint { index, position, feature })
    }

    /// Longitude, or plane x
    #[inline]
    pub fn x(&self) -> f64 {
        self.position[0]
    }

    /// Latitude, or plane y
    #[inline]
    pub fn y(&self) -> f64 {
        self.position[1]
    }

    /// Check if the coordinate lies strictly inside the lon/lat domain
    pub fn is_lon_lat(&self) -> bool {
        let (x, y) = (self.x(), self.y());
        x > -180.0 && x < 180.0 && y > -90.0 && y < 90.0
    }
}

/// Keep the point features of `features`, in order.
///
/// Everything that is not a point (lines, polygons, features without geometry)
/// is dropped. Fails when fewer than [`MIN_WAYPOINTS`] remain.
pub fn filter_points<I>(features: I) -> Result<Vec<Waypoint>>
where
    I: IntoIterator<Item = Feature>,
{
    let mut waypoints = Vec::new();
    for feature in features {
        if let Some(waypoint) = Waypoint::from_feature(waypoints.len(), feature) {
            waypoints.push(waypoint);
        }
    }

    if waypoints.len() < MIN_WAYPOINTS {
        return Err(TourError::InsufficientWaypoints { found: waypoints.len() });
    }

    log::debug!("kept {} point features", waypoints.len());
    Ok(waypoints)
}

/// Whole-set judgement: true only if every waypoint is a valid lon/lat pair.
pub fn is_geographic(waypoints: &[Waypoint]) -> bool {
    waypoints.iter().all(Waypoint::is_lon_lat)
}

/// Gate for the cost models that interpret coordinates as lon/lat.
///
/// The planar model accepts anything.
pub fn require_geographic(waypoints: &[Waypoint], model: CostModel) -> Result<()> {
    if !model.is_geographic() {
        return Ok(());
    }
    match waypoints.iter().find(|w| !w.is_lon_lat()) {
        Some(w) => Err(TourError::CoordinateDomain {
            model: model.name(),
            index: w.index,
            x: w.x(),
            y: w.y(),
        }),
        None => Ok(()),
    }
}
