//! End-to-end tour planning.
//!
//! The stages run strictly in sequence, each consuming the previous one's
//! output:
//!
//! features -> point filter -> coordinate check -> cost matrix -> symmetric
//! matrix -> solver -> ordered waypoints -> route geometry -> collection
//!
//! The first error aborts the run; nothing computed before it is returned.

use geojson::{Feature, FeatureCollection};

use crate::asymmetry::{self, AsymmetryStrategy};
use crate::collection::{self, DisplayOptions};
use crate::error::{Result, TourError};
use crate::instance::TspInstance;
use crate::matrix::{build_cost_matrix, CostModel};
use crate::provider::{DirectionsProvider, Profile, TravelCostProvider};
use crate::route::{self, RouteMode, MIN_BATCH_SIZE};
use crate::solver::TourSolver;
use crate::waypoint::{filter_points, require_geographic};

/// Every tour starts (and ends) at the first point feature.
pub const START_NODE: usize = 0;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct TourConfig {
    /// Instance name handed to the solver
    pub name: String,
    pub cost_model: CostModel,
    /// Travel profile for the travel-time and directions providers
    pub profile: Profile,
    pub asymmetry: AsymmetryStrategy,
    /// Ask for road geometry instead of straight segments
    pub directions: bool,
    pub display: DisplayOptions,
    /// Upper bound on waypoints per directions request
    pub max_batch_size: usize,
}

impl Default for TourConfig {
    fn default() -> Self {
        TourConfig {
            name: "My Route".to_string(),
            cost_model: CostModel::TravelTime,
            profile: Profile::Driving,
            asymmetry: AsymmetryStrategy::Average,
            directions: true,
            display: DisplayOptions::default(),
            max_batch_size: 25,
        }
    }
}

impl TourConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size < MIN_BATCH_SIZE {
            return Err(TourError::InvalidConfig(format!(
                "batch size must be at least {}, got {}",
                MIN_BATCH_SIZE, self.max_batch_size
            )));
        }
        Ok(())
    }

    /// Directions only make sense for lon/lat input; anything else gets straight lines.
    pub fn route_mode(&self) -> RouteMode {
        match (self.directions, self.cost_model.is_geographic()) {
            (true, true) => RouteMode::Directions,
            (true, false) => {
                log::warn!(
                    "directions are not available with the {} cost model, using straight lines",
                    self.cost_model
                );
                RouteMode::StraightLine
            }
            (false, _) => RouteMode::StraightLine,
        }
    }
}

/// Runs the whole pipeline against injected providers and solver
pub struct TourPlanner<P, S> {
    config: TourConfig,
    provider: P,
    solver: S,
}

impl<P, S> TourPlanner<P, S>
where
    P: TravelCostProvider + DirectionsProvider,
    S: TourSolver,
{
    pub fn new(config: TourConfig, provider: P, solver: S) -> Self {
        TourPlanner { config, provider, solver }
    }

    /// Compute the tour over the point features of `features` and render it
    pub async fn plan(&self, features: Vec<Feature>) -> Result<FeatureCollection> {
        let config = &self.config;
        config.validate()?;
        let mode = config.route_mode();

        let waypoints = filter_points(features)?;
        require_geographic(&waypoints, config.cost_model)?;

        log::info!("building {} cost matrix for {} waypoints", config.cost_model, waypoints.len());
        let matrix =
            build_cost_matrix(&waypoints, config.cost_model, &self.provider, config.profile).await?;
        let symmetric = asymmetry::resolve(matrix, config.asymmetry);
        let instance = TspInstance::new(config.name.as_str(), symmetric);
        log::debug!("{}", instance.statistics());

        log::info!("solving with {}", self.solver.name());
        let tour = self.solver.solve(&instance, START_NODE)?;
        if tour.start() != Some(START_NODE) {
            return Err(TourError::SolverInvocation(format!(
                "tour starts at node {:?}, expected {}",
                tour.start(),
                START_NODE
            )));
        }
        log::info!("tour cost {:.2}", instance.tour_length(tour.as_slice()));
        log::debug!("tour: {}", tour);

        let ordered = tour.reorder(&waypoints)?;
        let routes = route::assemble(
            mode,
            &ordered,
            &tour,
            &self.provider,
            config.profile,
            config.max_batch_size,
        )
        .await?;

        Ok(collection::compose(ordered, routes, config.display))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::FeatureOrder;
    use crate::provider::tests::FakeProvider;
    use crate::solver::HeuristicSolver;
    use crate::waypoint::tests::point_feature;
    use geojson::Value;

    fn features(coords: &[(f64, f64)]) -> Vec<Feature> {
        coords.iter().map(|&(x, y)| point_feature(x, y)).collect()
    }

    fn planner(
        config: TourConfig,
        provider: FakeProvider,
    ) -> TourPlanner<FakeProvider, HeuristicSolver> {
        TourPlanner::new(config, provider, HeuristicSolver::default())
    }

    fn point_coords(feature: &Feature) -> Option<Vec<f64>> {
        match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Point(p)) => Some(p.clone()),
            _ => None,
        }
    }

    fn line_coords(feature: &Feature) -> Option<Vec<Vec<f64>>> {
        match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::LineString(coords)) => Some(coords.clone()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_planar_triangle_with_straight_line() {
        let config = TourConfig {
            cost_model: CostModel::Planar,
            directions: false,
            ..Default::default()
        };
        let planner = planner(config, FakeProvider::default());
        let input = [(0.0, 0.0), (0.0, 10.0), (10.0, 0.0)];

        let collection = planner.plan(features(&input)).await.unwrap();

        assert_eq!(collection.features.len(), 4);
        let points: Vec<Vec<f64>> =
            collection.features[..3].iter().filter_map(point_coords).collect();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], vec![0.0, 0.0]);

        let line = line_coords(&collection.features[3]).unwrap();
        assert_eq!(line.len(), 4);
        assert_eq!(line[0], line[3]);
        assert_eq!(&line[..3], points.as_slice());
        let mut visited: Vec<Vec<f64>> = line[..3].to_vec();
        visited.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut expected: Vec<Vec<f64>> = input.iter().map(|&(x, y)| vec![x, y]).collect();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(visited, expected);
    }

    #[tokio::test]
    async fn test_two_points_fail_before_matrix() {
        let provider = FakeProvider::default();
        let planner = planner(TourConfig::default(), provider);

        let err = planner.plan(features(&[(0.0, 0.0), (1.0, 1.0)])).await.unwrap_err();

        assert!(matches!(err, TourError::InsufficientWaypoints { found: 2 }));
        assert_eq!(planner.provider.matrix_calls(), 0);
    }

    #[tokio::test]
    async fn test_geodesic_rejects_non_lon_lat() {
        let config = TourConfig { cost_model: CostModel::Geodesic, ..Default::default() };
        let planner = planner(config, FakeProvider::default());

        let err = planner
            .plan(features(&[(0.0, 0.0), (200.0, 10.0), (10.0, 0.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, TourError::CoordinateDomain { .. }));
    }

    #[tokio::test]
    async fn test_directions_for_26_waypoints() {
        let config = TourConfig { cost_model: CostModel::Geodesic, ..Default::default() };
        let planner = planner(config, FakeProvider::default());
        let input: Vec<(f64, f64)> = (0..26)
            .map(|i| (-122.0 + (i % 5) as f64 * 0.05, 37.0 + (i / 5) as f64 * 0.05))
            .collect();

        let collection = planner.plan(features(&input)).await.unwrap();

        let calls = planner.provider.route_calls();
        assert_eq!(calls.len(), 2);
        let covered: Vec<usize> = calls.concat();
        assert_eq!(covered.len(), 27);
        assert_eq!(covered[0], 0);
        assert_eq!(covered[26], 0);
        assert_eq!(collection.features.len(), 26 + 2);

        let mut visited = covered[..26].to_vec();
        visited.sort_unstable();
        assert_eq!(visited, (0..26).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_travel_time_uses_one_matrix_call() {
        let config = TourConfig {
            directions: false,
            display: DisplayOptions { include_points: false, order: FeatureOrder::PointsFirst },
            ..Default::default()
        };
        let planner = planner(config, FakeProvider::default());

        let collection = planner
            .plan(features(&[(-122.4, 37.8), (-122.3, 37.7), (-122.2, 37.9), (-122.1, 37.6)]))
            .await
            .unwrap();

        assert_eq!(planner.provider.matrix_calls(), 1);
        assert_eq!(collection.features.len(), 1);
        assert!(planner.provider.route_calls().is_empty());
    }

    #[tokio::test]
    async fn test_planar_with_directions_falls_back_to_straight_line() {
        let config = TourConfig { cost_model: CostModel::Planar, ..Default::default() };
        assert_eq!(config.route_mode(), RouteMode::StraightLine);
        let planner = planner(config, FakeProvider::default());

        let collection = planner
            .plan(features(&[(0.0, 0.0), (500.0, 10.0), (10.0, 900.0)]))
            .await
            .unwrap();

        assert!(planner.provider.route_calls().is_empty());
        assert_eq!(collection.features.len(), 4);
    }

    #[tokio::test]
    async fn test_directions_failure_discards_everything() {
        let config = TourConfig { cost_model: CostModel::Geodesic, ..Default::default() };
        let planner = planner(config, FakeProvider::failing_route_call(1));
        let input: Vec<(f64, f64)> = (0..30)
            .map(|i| (i as f64 * 0.01, 45.0 + (i % 3) as f64 * 0.01))
            .collect();

        let err = planner.plan(features(&input)).await.unwrap_err();
        assert!(matches!(err, TourError::Provider { .. }));
        assert_eq!(planner.provider.route_calls().len(), 2);
    }

    #[test]
    fn test_batch_size_validation() {
        for size in [1, 2] {
            let config = TourConfig { max_batch_size: size, ..Default::default() };
            assert!(matches!(config.validate(), Err(TourError::InvalidConfig(_))));
        }
        let config = TourConfig { max_batch_size: 3, ..Default::default() };
        assert!(config.validate().is_ok());
        assert!(TourConfig::default().validate().is_ok());
    }

    #[tokio::test]
    async fn test_batch_size_two_fails_before_any_request() {
        let config = TourConfig {
            cost_model: CostModel::Geodesic,
            max_batch_size: 2,
            ..Default::default()
        };
        let planner = planner(config, FakeProvider::default());

        let err = planner
            .plan(features(&[(0.0, 45.0), (0.01, 45.0), (0.02, 45.0), (0.03, 45.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, TourError::InvalidConfig(_)));
        assert!(planner.provider.route_calls().is_empty());
    }
}
