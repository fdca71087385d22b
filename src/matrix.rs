//! Travel-cost matrices.
//!
//! Three cost models are supported:
//! - planar: Euclidean distance on unitless plane coordinates
//! - geodesic: great-circle distance in metres (spherical law of cosines)
//! - travel-time: pairwise durations in seconds from an external provider
//!
//! Whatever the model, the result is an N x N matrix with a zero diagonal.
//! Travel-time matrices may be asymmetric.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TourError};
use crate::provider::{Profile, TravelCostProvider};
use crate::waypoint::Waypoint;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Cost model used to price a move between two waypoints
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostModel {
    Planar,
    Geodesic,
    TravelTime,
}

impl CostModel {
    pub fn name(&self) -> &'static str {
        match self {
            CostModel::Planar => "planar",
            CostModel::Geodesic => "geodesic",
            CostModel::TravelTime => "travel-time",
        }
    }

    /// Whether the model reads coordinates as longitude/latitude
    pub fn is_geographic(&self) -> bool {
        !matches!(self, CostModel::Planar)
    }
}

impl std::fmt::Display for CostModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Square matrix of non-negative travel costs, `cost(i, j)` from `i` to `j`
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    values: Vec<Vec<f64>>,
}

impl CostMatrix {
    /// Build from raw rows.
    ///
    /// Rows must form a square matrix of finite, non-negative values. The
    /// diagonal is forced to zero.
    pub fn from_rows(mut values: Vec<Vec<f64>>) -> Result<Self> {
        let n = values.len();
        for (i, row) in values.iter_mut().enumerate() {
            if row.len() != n {
                return Err(TourError::InvalidMatrix(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite() || *v < 0.0) {
                return Err(TourError::InvalidMatrix(format!(
                    "cost({}, {}) = {} is not a non-negative number",
                    i, j, row[j]
                )));
            }
            row[i] = 0.0;
        }
        Ok(CostMatrix { values })
    }

    /// Euclidean distance between plane coordinates
    pub fn planar(waypoints: &[Waypoint]) -> Self {
        Self::pairwise(waypoints, |a, b| {
            let dx = a.x() - b.x();
            let dy = a.y() - b.y();
            (dx * dx + dy * dy).sqrt()
        })
    }

    /// Great-circle distance in metres between lon/lat coordinates
    pub fn geodesic(waypoints: &[Waypoint]) -> Self {
        Self::pairwise(waypoints, great_circle_distance)
    }

    fn pairwise<F>(waypoints: &[Waypoint], cost: F) -> Self
    where
        F: Fn(&Waypoint, &Waypoint) -> f64,
    {
        let n = waypoints.len();
        let mut values = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    values[i][j] = cost(&waypoints[i], &waypoints[j]);
                }
            }
        }

        CostMatrix { values }
    }

    /// Number of waypoints covered
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cost of travelling from `i` to `j`
    #[inline]
    pub fn cost(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Check `cost(i, j) == cost(j, i)` within `tolerance`
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.len();
        (0..n).all(|i| {
            (i + 1..n).all(|j| (self.values[i][j] - self.values[j][i]).abs() <= tolerance)
        })
    }
}

/// Great-circle distance in metres, spherical law of cosines.
///
/// Identical points short-circuit to zero: round-off can push the cosine
/// slightly above 1 and `acos` would return NaN.
pub fn great_circle_distance(a: &Waypoint, b: &Waypoint) -> f64 {
    if a.x() == b.x() && a.y() == b.y() {
        return 0.0;
    }
    let (lon1, lat1) = (a.x().to_radians(), a.y().to_radians());
    let (lon2, lat2) = (b.x().to_radians(), b.y().to_radians());

    let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon2 - lon1).cos();
    EARTH_RADIUS_M * cos_angle.clamp(-1.0, 1.0).acos()
}

/// Build the cost matrix for `waypoints` under `model`.
///
/// Only the travel-time model touches the provider, with a single request
/// covering the whole waypoint set. Geographic models expect the caller to
/// have validated the coordinate domain.
pub async fn build_cost_matrix<P>(
    waypoints: &[Waypoint],
    model: CostModel,
    provider: &P,
    profile: Profile,
) -> Result<CostMatrix>
where
    P: TravelCostProvider,
{
    let matrix = match model {
        CostModel::Planar => CostMatrix::planar(waypoints),
        CostModel::Geodesic => CostMatrix::geodesic(waypoints),
        CostModel::TravelTime => provider.durations(waypoints, profile).await?,
    };

    if matrix.len() != waypoints.len() {
        return Err(TourError::InvalidMatrix(format!(
            "{} matrix has dimension {}, expected {}",
            model,
            matrix.len(),
            waypoints.len()
        )));
    }

    log::debug!("built {}x{} {} cost matrix", matrix.len(), matrix.len(), model);
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::tests::FakeProvider;
    use crate::waypoint::tests::waypoints;

    fn assert_zero_diagonal(matrix: &CostMatrix) {
        for i in 0..matrix.len() {
            assert_eq!(matrix.cost(i, i), 0.0);
        }
    }

    #[test]
    fn test_planar_distance() {
        let wps = waypoints(&[(0.0, 0.0), (3.0, 4.0), (0.0, 4.0)]);
        let matrix = CostMatrix::planar(&wps);

        assert_eq!(matrix.len(), 3);
        assert!((matrix.cost(0, 1) - 5.0).abs() < 1e-10);
        assert!((matrix.cost(1, 0) - 5.0).abs() < 1e-10);
        assert!((matrix.cost(1, 2) - 3.0).abs() < 1e-10);
        assert_zero_diagonal(&matrix);
    }

    #[test]
    fn test_geodesic_is_symmetric_with_zero_diagonal() {
        let wps = waypoints(&[
            (-124.08, 40.87),
            (-122.42, 37.77),
            (-118.24, 34.05),
            (-124.08, 40.87),
        ]);
        let matrix = CostMatrix::geodesic(&wps);

        assert_zero_diagonal(&matrix);
        assert!(matrix.is_symmetric(1e-6));
        // Duplicate coordinates under different indices
        assert_eq!(matrix.cost(0, 3), 0.0);
        assert!(matrix.rows().iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_geodesic_quarter_meridian() {
        let wps = waypoints(&[(0.0, 0.0), (0.0, 89.999999), (90.0, 0.0)]);
        let matrix = CostMatrix::geodesic(&wps);
        let quarter = std::f64::consts::FRAC_PI_2 * EARTH_RADIUS_M;

        assert!((matrix.cost(0, 2) - quarter).abs() < 1.0);
        assert!((matrix.cost(0, 1) - quarter).abs() < 1.0);
    }

    #[test]
    fn test_from_rows_rejects_ragged_and_negative() {
        assert!(CostMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]).is_err());
        assert!(CostMatrix::from_rows(vec![vec![0.0, -1.0], vec![1.0, 0.0]]).is_err());
        assert!(CostMatrix::from_rows(vec![vec![0.0, f64::NAN], vec![1.0, 0.0]]).is_err());
    }

    #[test]
    fn test_from_rows_zeroes_diagonal() {
        let matrix = CostMatrix::from_rows(vec![vec![2.0, 1.0], vec![3.0, 4.0]]).unwrap();
        assert_zero_diagonal(&matrix);
        assert_eq!(matrix.cost(1, 0), 3.0);
        assert!(!matrix.is_symmetric(1e-9));
    }

    #[tokio::test]
    async fn test_every_model_yields_square_matrix() {
        let wps = waypoints(&[(-122.4, 37.8), (-122.3, 37.9), (-122.2, 37.7), (-122.1, 37.6)]);
        let provider = FakeProvider::default();

        for model in [CostModel::Planar, CostModel::Geodesic, CostModel::TravelTime] {
            let matrix = build_cost_matrix(&wps, model, &provider, Profile::Driving).await.unwrap();
            assert_eq!(matrix.len(), wps.len(), "{}", model);
            assert!(matrix.rows().iter().all(|row| row.len() == wps.len()));
            assert_zero_diagonal(&matrix);
        }
        assert_eq!(provider.matrix_calls(), 1);
    }

    #[tokio::test]
    async fn test_provider_dimension_mismatch_is_rejected() {
        let wps = waypoints(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let provider = FakeProvider::with_durations(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);

        let err = build_cost_matrix(&wps, CostModel::TravelTime, &provider, Profile::Driving)
            .await
            .unwrap_err();
        assert!(matches!(err, TourError::InvalidMatrix(_)));
    }
}
