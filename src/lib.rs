//! Optimal Tour Library
//!
//! Computes a closed tour through a set of geographic (or planar) waypoints
//! read as GeoJSON, and renders it back as a GeoJSON FeatureCollection.
//!
//! # Features
//!
//! - Cost matrices from planar distance, great-circle distance or road travel time
//! - Asymmetric travel times folded into a symmetric instance
//! - External Concorde solver via TSPLIB, or a built-in heuristic solver
//! - Route geometry from a directions service (batched) or straight segments
//!
//! # Example
//!
//! ```no_run
//! use optimal_tour::input::parse_features;
//! use optimal_tour::matrix::CostModel;
//! use optimal_tour::pipeline::{TourConfig, TourPlanner};
//! use optimal_tour::provider::{MapboxClient, MapboxConfig};
//! use optimal_tour::solver::HeuristicSolver;
//!
//! # async fn run(text: &str) -> optimal_tour::Result<()> {
//! let config = TourConfig {
//!     cost_model: CostModel::Geodesic,
//!     directions: false,
//!     ..Default::default()
//! };
//! let provider = MapboxClient::new(MapboxConfig::default())?;
//! let planner = TourPlanner::new(config, provider, HeuristicSolver::default());
//!
//! let collection = planner.plan(parse_features(text)?).await?;
//! println!("{}", serde_json::to_string(&collection)?);
//! # Ok(())
//! # }
//! ```

pub mod asymmetry;
pub mod collection;
pub mod error;
pub mod input;
pub mod instance;
pub mod matrix;
pub mod pipeline;
pub mod provider;
pub mod route;
pub mod solver;
pub mod tour;
pub mod waypoint;

pub use error::{Result, TourError};
pub use instance::TspInstance;
pub use pipeline::{TourConfig, TourPlanner};
pub use tour::TourOrder;
