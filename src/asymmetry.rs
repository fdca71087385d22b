//! Asymmetric to symmetric cost matrix resolution.
//!
//! The solver only accepts symmetric instances, so directional costs (one-way
//! streets, uphill legs) must be folded into a single value per unordered
//! pair. Every strategy here is a named approximation: the direction of
//! travel is lost.

use serde::{Deserialize, Serialize};

use crate::matrix::CostMatrix;

/// How `cost(i, j)` and `cost(j, i)` are combined
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AsymmetryStrategy {
    /// `(cost(i, j) + cost(j, i)) / 2`
    #[default]
    Average,
    /// Value from the lower triangle (row > column)
    Lower,
    /// Value from the upper triangle (row < column)
    Upper,
}

/// Cost matrix with `cost(i, j) == cost(j, i)` for every pair.
///
/// Only obtainable through [`resolve`], and only used as solver input.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricCostMatrix {
    values: Vec<Vec<f64>>,
}

impl SymmetricCostMatrix {
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn cost(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }
}

/// Fold `matrix` into a symmetric one. The input matrix is consumed.
pub fn resolve(matrix: CostMatrix, strategy: AsymmetryStrategy) -> SymmetricCostMatrix {
    let n = matrix.len();
    let mut values = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in i + 1..n {
            let (upper, lower) = (matrix.cost(i, j), matrix.cost(j, i));
            let cost = match strategy {
                AsymmetryStrategy::Average => (upper + lower) / 2.0,
                AsymmetryStrategy::Lower => lower,
                AsymmetryStrategy::Upper => upper,
            };
            values[i][j] = cost;
            values[j][i] = cost;
        }
    }

    log::debug!("resolved {}x{} matrix with {:?} strategy", n, n, strategy);
    SymmetricCostMatrix { values }
}
