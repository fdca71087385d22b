//! Error types for the tour pipeline.
//!
//! Every failure is fatal for the current run: nothing is retried and no
//! partial collection is ever emitted.

use thiserror::Error;

/// Errors raised anywhere between reading features and composing the output.
#[derive(Debug, Error)]
pub enum TourError {
    /// Fewer than three point features survived filtering.
    #[error("need at least 3 point features to create a route, found {found}")]
    InsufficientWaypoints { found: usize },

    /// A geographic cost model was requested for coordinates outside lon/lat bounds.
    #[error("{model} cost model needs lon/lat, waypoint {index} is ({x}, {y})")]
    CoordinateDomain {
        model: &'static str,
        index: usize,
        x: f64,
        y: f64,
    },

    /// The travel-cost or directions service answered with a failure.
    #[error("got a {status} error from the {service} API: {body}")]
    Provider {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no access token configured for the routing provider")]
    MissingAccessToken,

    /// The external solver failed or returned something that is not a tour.
    #[error("solver invocation failed: {0}")]
    SolverInvocation(String),

    #[error("invalid cost matrix: {0}")]
    InvalidMatrix(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input could not be read as GeoJSON.
    #[error("invalid input: {0}")]
    Input(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for tour operations.
pub type Result<T> = std::result::Result<T, TourError>;
