//! Optimal Tour - Command Line Interface
//!
//! Reads GeoJSON point features, computes the optimal closed tour through
//! them and writes the tour as a GeoJSON FeatureCollection to stdout.

use clap::{Parser, ValueEnum};
use optimal_tour::asymmetry::AsymmetryStrategy;
use optimal_tour::collection::{DisplayOptions, FeatureOrder};
use optimal_tour::input::read_features;
use optimal_tour::instance::EdgeWeightFormat;
use optimal_tour::matrix::CostModel;
use optimal_tour::pipeline::{TourConfig, TourPlanner};
use optimal_tour::provider::{MapboxClient, MapboxConfig, Profile};
use optimal_tour::solver::{
    ConcordeConfig, ConcordeSolver, HeuristicConfig, HeuristicSolver, TourSolver,
};

use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "optimal-tour")]
#[command(version)]
#[command(about = "Compute the optimal closed tour through GeoJSON points")]
struct Cli {
    /// GeoJSON input file (stdin when omitted or `-`)
    input: Option<PathBuf>,

    /// How the cost between two waypoints is measured
    #[arg(long, value_enum, default_value = "travel-time")]
    cost_model: CostModelArg,

    /// Travel profile for travel times and directions
    #[arg(long, value_enum, default_value = "driving")]
    profile: ProfileArg,

    /// Connect waypoints with straight lines instead of road directions
    #[arg(long)]
    no_directions: bool,

    /// Leave the waypoints out of the output collection
    #[arg(long)]
    no_points: bool,

    /// Put route geometry before the points in the output
    #[arg(long)]
    geometry_first: bool,

    /// How asymmetric travel times are made symmetric
    #[arg(long, value_enum, default_value = "average")]
    asymmetry: AsymmetryArg,

    /// Tour solver
    #[arg(long, value_enum, default_value = "concorde")]
    solver: SolverArg,

    /// Path to the Concorde executable
    #[arg(long, default_value = "concorde")]
    concorde: PathBuf,

    /// Costs are multiplied by this before rounding to TSPLIB integer weights
    #[arg(long, default_value = "1.0")]
    weight_scale: f64,

    /// TSPLIB matrix layout handed to Concorde
    #[arg(long, value_enum, default_value = "lower-diag-row")]
    edge_weight_format: EdgeWeightFormatArg,

    /// Randomized restarts of the heuristic solver
    #[arg(long, default_value = "8")]
    restarts: usize,

    /// Random seed for the heuristic solver
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Maximum waypoints per directions request
    #[arg(long, default_value = "25")]
    batch_size: usize,

    /// Instance name handed to the solver
    #[arg(long, default_value = "My Route")]
    name: String,

    /// Mapbox access token
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Mapbox API root
    #[arg(long, default_value = optimal_tour::provider::mapbox::DEFAULT_BASE_URL)]
    base_url: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum CostModelArg {
    /// Euclidean distance in input units
    Planar,
    /// Great-circle distance in metres
    Geodesic,
    /// Road travel time in seconds
    TravelTime,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ProfileArg {
    Driving,
    DrivingTraffic,
    Walking,
    Cycling,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum AsymmetryArg {
    /// Mean of both directions
    Average,
    /// Value from the lower triangle (row > column)
    Lower,
    /// Value from the upper triangle (row < column)
    Upper,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum SolverArg {
    /// External Concorde executable
    Concorde,
    /// Built-in nearest neighbour + 2-opt
    Heuristic,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum EdgeWeightFormatArg {
    LowerDiagRow,
    FullMatrix,
}

impl From<CostModelArg> for CostModel {
    fn from(arg: CostModelArg) -> Self {
        match arg {
            CostModelArg::Planar => CostModel::Planar,
            CostModelArg::Geodesic => CostModel::Geodesic,
            CostModelArg::TravelTime => CostModel::TravelTime,
        }
    }
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Driving => Profile::Driving,
            ProfileArg::DrivingTraffic => Profile::DrivingTraffic,
            ProfileArg::Walking => Profile::Walking,
            ProfileArg::Cycling => Profile::Cycling,
        }
    }
}

impl From<AsymmetryArg> for AsymmetryStrategy {
    fn from(arg: AsymmetryArg) -> Self {
        match arg {
            AsymmetryArg::Average => AsymmetryStrategy::Average,
            AsymmetryArg::Lower => AsymmetryStrategy::Lower,
            AsymmetryArg::Upper => AsymmetryStrategy::Upper,
        }
    }
}

impl From<EdgeWeightFormatArg> for EdgeWeightFormat {
    fn from(arg: EdgeWeightFormatArg) -> Self {
        match arg {
            EdgeWeightFormatArg::LowerDiagRow => EdgeWeightFormat::LowerDiagRow,
            EdgeWeightFormatArg::FullMatrix => EdgeWeightFormat::FullMatrix,
        }
    }
}

impl Cli {
    fn tour_config(&self) -> TourConfig {
        TourConfig {
            name: self.name.clone(),
            cost_model: self.cost_model.into(),
            profile: self.profile.into(),
            asymmetry: self.asymmetry.into(),
            directions: !self.no_directions,
            display: DisplayOptions {
                include_points: !self.no_points,
                order: if self.geometry_first {
                    FeatureOrder::GeometryFirst
                } else {
                    FeatureOrder::PointsFirst
                },
            },
            max_batch_size: self.batch_size,
        }
    }

    fn mapbox_config(&self) -> MapboxConfig {
        MapboxConfig {
            access_token: self.access_token.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }

    fn solver(&self) -> Box<dyn TourSolver> {
        match self.solver {
            SolverArg::Concorde => Box::new(ConcordeSolver::new(ConcordeConfig {
                executable: self.concorde.clone(),
                weight_scale: self.weight_scale,
                edge_weight_format: self.edge_weight_format.into(),
                ..Default::default()
            })),
            SolverArg::Heuristic => Box::new(HeuristicSolver::new(HeuristicConfig {
                restarts: self.restarts,
                seed: self.seed,
                ..Default::default()
            })),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let features = read_features(cli.input.as_deref()).with_context(|| match &cli.input {
        Some(path) => format!("failed to read GeoJSON from {}", path.display()),
        None => "failed to read GeoJSON from stdin".to_string(),
    })?;

    let provider = MapboxClient::new(cli.mapbox_config()).context("failed to build HTTP client")?;
    let solver = cli.solver();
    let planner = TourPlanner::new(cli.tour_config(), provider, solver);

    let collection = planner.plan(features).await?;
    println!("{}", serde_json::to_string(&collection)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["optimal-tour"]);
        let config = cli.tour_config();

        assert_eq!(config.cost_model, CostModel::TravelTime);
        assert!(config.directions);
        assert!(config.display.include_points);
        assert_eq!(config.display.order, FeatureOrder::PointsFirst);
        assert_eq!(config.max_batch_size, 25);
        assert_eq!(config.name, "My Route");
        assert_eq!(cli.solver().name(), "Concorde");
    }

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::parse_from([
            "optimal-tour",
            "points.geojson",
            "--cost-model",
            "geodesic",
            "--profile",
            "walking",
            "--no-directions",
            "--geometry-first",
            "--asymmetry",
            "upper",
            "--solver",
            "heuristic",
        ]);
        let config = cli.tour_config();

        assert_eq!(cli.input, Some(PathBuf::from("points.geojson")));
        assert_eq!(config.cost_model, CostModel::Geodesic);
        assert_eq!(config.profile, Profile::Walking);
        assert_eq!(config.asymmetry, AsymmetryStrategy::Upper);
        assert!(!config.directions);
        assert_eq!(config.display.order, FeatureOrder::GeometryFirst);
        assert_eq!(cli.solver().name(), "NearestNeighbor+2-Opt");
    }

    #[test]
    fn test_asymmetry_help_names_the_triangle() {
        let help = |arg: AsymmetryArg| {
            arg.to_possible_value()
                .and_then(|v| v.get_help().map(|h| h.to_string()))
                .unwrap_or_default()
        };

        assert!(help(AsymmetryArg::Lower).contains("lower triangle"));
        assert!(help(AsymmetryArg::Upper).contains("upper triangle"));
        assert_eq!(AsymmetryStrategy::from(AsymmetryArg::Lower), AsymmetryStrategy::Lower);
        assert_eq!(AsymmetryStrategy::from(AsymmetryArg::Upper), AsymmetryStrategy::Upper);
    }
}
