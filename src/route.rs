//! Route geometry for an ordered tour.
//!
//! Two modes:
//! - directions: the closed tour is cut into batches small enough for the
//!   directions provider, each batch is routed by one request, and the
//!   resulting line features are collected in batch order
//! - straight line: one LineString through every waypoint, back to the start

use geojson::{Feature, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, TourError};
use crate::provider::{DirectionsProvider, Profile};
use crate::tour::TourOrder;
use crate::waypoint::Waypoint;

/// Smallest batch limit for which `partition` never yields a single-waypoint chunk.
pub const MIN_BATCH_SIZE: usize = 3;

/// How waypoints are connected in the output
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteMode {
    /// Road geometry from the directions provider
    Directions,
    /// Straight segments between consecutive waypoints
    StraightLine,
}

/// A contiguous slice of the closed tour, routed by a single request
#[derive(Debug, Clone, Copy)]
pub struct RouteSegmentBatch<'a> {
    /// Position of the batch in the tour
    pub index: usize,
    pub waypoints: &'a [Waypoint],
}

/// Split `sequence` into `ceil(len / max_batch)` contiguous chunks whose sizes
/// differ by at most one. Concatenating the chunks gives back `sequence`.
pub fn partition<T>(sequence: &[T], max_batch: usize) -> Vec<&[T]> {
    let len = sequence.len();
    if len == 0 {
        return Vec::new();
    }
    let max_batch = max_batch.max(1);

    let n = len.div_ceil(max_batch);
    let (k, m) = (len / n, len % n);

    (0..n)
        .map(|i| &sequence[i * k + i.min(m)..(i + 1) * k + (i + 1).min(m)])
        .collect()
}

/// The tour with its first waypoint appended, so the route returns home
pub fn close_loop(ordered: &[Waypoint]) -> Vec<Waypoint> {
    let mut closed = ordered.to_vec();
    if let Some(first) = ordered.first() {
        closed.push(first.clone());
    }
    closed
}

/// Batches of the closed tour, each no larger than `max_batch`
pub fn batches(closed: &[Waypoint], max_batch: usize) -> Vec<RouteSegmentBatch<'_>> {
    partition(closed, max_batch)
        .into_iter()
        .enumerate()
        .map(|(index, waypoints)| RouteSegmentBatch { index, waypoints })
        .collect()
}

/// One closed LineString through the ordered waypoints.
///
/// The feature carries the visiting order under the `tour` property.
pub fn straight_line(ordered: &[Waypoint], tour: &TourOrder) -> Feature {
    let coords = close_loop(ordered).into_iter().map(|w| w.position).collect();

    let mut properties = JsonObject::new();
    properties.insert("tour".to_string(), json!(tour.as_slice()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coords))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Route every batch of the closed tour, strictly one after the other.
///
/// Output order is batch order. The first failing batch aborts the whole
/// assembly and nothing routed so far is returned.
pub async fn directions<P>(
    ordered: &[Waypoint],
    provider: &P,
    profile: Profile,
    max_batch: usize,
) -> Result<Vec<Feature>>
where
    P: DirectionsProvider,
{
    let max_batch = max_batch.min(provider.max_waypoints());
    if max_batch < MIN_BATCH_SIZE {
        return Err(TourError::InvalidConfig(format!(
            "directions batch limit must be at least {}, got {}",
            MIN_BATCH_SIZE, max_batch
        )));
    }

    let closed = close_loop(ordered);
    let batches = batches(&closed, max_batch);
    log::info!(
        "requesting directions for {} waypoints in {} batch(es)",
        closed.len(),
        batches.len()
    );

    let mut routes = Vec::with_capacity(batches.len());
    for batch in &batches {
        log::debug!(
            "batch {}: waypoints {} to {}",
            batch.index,
            batch.waypoints.first().map_or(0, |w| w.index),
            batch.waypoints.last().map_or(0, |w| w.index)
        );
        let mut feature = provider.route(batch.waypoints, profile).await?;
        feature
            .properties
            .get_or_insert_with(JsonObject::new)
            .insert("batch".to_string(), json!(batch.index));
        routes.push(feature);
    }

    Ok(routes)
}

/// Build the route feature(s) for `ordered` in the given mode
pub async fn assemble<P>(
    mode: RouteMode,
    ordered: &[Waypoint],
    tour: &TourOrder,
    provider: &P,
    profile: Profile,
    max_batch: usize,
) -> Result<Vec<Feature>>
where
    P: DirectionsProvider,
{
    match mode {
        RouteMode::Directions => directions(ordered, provider, profile, max_batch).await,
        RouteMode::StraightLine => Ok(vec![straight_line(ordered, tour)]),
    }
}
