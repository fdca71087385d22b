//! Symmetric TSP instances and their TSPLIB serialization.
//!
//! An instance pairs a name with the symmetric cost matrix handed to the
//! solver. External solvers read it as an explicit-matrix TSPLIB file:
//!
//! ```text
//! NAME: My Route
//! TYPE: TSP
//! COMMENT: My Route
//! DIMENSION: 3
//! EDGE_WEIGHT_TYPE: EXPLICIT
//! EDGE_WEIGHT_FORMAT: LOWER_DIAG_ROW
//! EDGE_WEIGHT_SECTION
//! 0
//! 10 0
//! 10 14 0
//! EOF
//! ```
//!
//! TSPLIB weights are integers, so costs are scaled and rounded on the way out.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::asymmetry::SymmetricCostMatrix;
use crate::error::Result;

/// Layout of the EDGE_WEIGHT_SECTION
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeWeightFormat {
    /// Row `i` holds columns `0..=i`, diagonal included
    #[default]
    LowerDiagRow,
    /// Every row holds every column
    FullMatrix,
}

impl EdgeWeightFormat {
    pub fn keyword(&self) -> &'static str {
        match self {
            EdgeWeightFormat::LowerDiagRow => "LOWER_DIAG_ROW",
            EdgeWeightFormat::FullMatrix => "FULL_MATRIX",
        }
    }
}

/// A symmetric TSP instance
#[derive(Debug, Clone)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Number of nodes
    pub dimension: usize,
    /// Symmetric travel costs between nodes
    pub matrix: SymmetricCostMatrix,
}

impl TspInstance {
    pub fn new(name: impl Into<String>, matrix: SymmetricCostMatrix) -> Self {
        TspInstance {
            name: name.into(),
            dimension: matrix.len(),
            matrix,
        }
    }

    /// Get the cost between two nodes
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.matrix.cost(i, j)
    }

    /// Length of the closed tour, including the edge back to the first node
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let mut length = 0.0;
        for i in 0..tour.len() - 1 {
            length += self.distance(tour[i], tour[i + 1]);
        }

        length += self.distance(tour[tour.len() - 1], tour[0]);

        length
    }

    /// Serialize as an explicit-matrix TSPLIB document.
    ///
    /// Each cost is written as `round(cost * weight_scale)`.
    pub fn to_tsplib(&self, format: EdgeWeightFormat, weight_scale: f64) -> String {
        let mut out = String::new();
        let name = self.name.replace(['\n', '\r'], " ");

        // Writing into a String cannot fail
        let _ = writeln!(out, "NAME: {}", name);
        let _ = writeln!(out, "TYPE: TSP");
        let _ = writeln!(out, "COMMENT: {}", name);
        let _ = writeln!(out, "DIMENSION: {}", self.dimension);
        let _ = writeln!(out, "EDGE_WEIGHT_TYPE: EXPLICIT");
        let _ = writeln!(out, "EDGE_WEIGHT_FORMAT: {}", format.keyword());
        out.push_str("EDGE_WEIGHT_SECTION\n");

        for i in 0..self.dimension {
            let columns = match format {
                EdgeWeightFormat::LowerDiagRow => i + 1,
                EdgeWeightFormat::FullMatrix => self.dimension,
            };
            let row = (0..columns)
                .map(|j| scaled_weight(self.distance(i, j), weight_scale).to_string())
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&row);
            out.push('\n');
        }

        out.push_str("EOF\n");
        out
    }

    pub fn write_tsplib<P: AsRef<Path>>(
        &self,
        path: P,
        format: EdgeWeightFormat,
        weight_scale: f64,
    ) -> Result<()> {
        fs::write(path, self.to_tsplib(format, weight_scale))?;
        Ok(())
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut distances: Vec<f64> = Vec::new();
        for i in 0..self.dimension {
            for j in i + 1..self.dimension {
                distances.push(self.distance(i, j));
            }
        }
        let avg_distance = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            avg_distance,
            max_distance,
        }
    }
}

fn scaled_weight(cost: f64, weight_scale: f64) -> u64 {
    (cost * weight_scale).round().max(0.0) as u64
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub avg_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Instance: {} | Nodes: {} | Avg cost: {:.2} | Max cost: {:.2}",
            self.name, self.dimension, self.avg_distance, self.max_distance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asymmetry::{resolve, AsymmetryStrategy};
    use crate::matrix::CostMatrix;
    use crate::waypoint::tests::waypoints;

    fn triangle() -> TspInstance {
        let wps = waypoints(&[(0.0, 0.0), (0.0, 10.0), (10.0, 0.0)]);
        let matrix = resolve(CostMatrix::planar(&wps), AsymmetryStrategy::Average);
        TspInstance::new("My Route", matrix)
    }

    #[test]
    fn test_tour_length_closes_the_cycle() {
        let instance = triangle();
        let expected = 10.0 + 200f64.sqrt() + 10.0;
        assert!((instance.tour_length(&[0, 1, 2]) - expected).abs() < 1e-9);
        assert!((instance.tour_length(&[0, 2, 1]) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_lower_diag_row_document() {
        let text = triangle().to_tsplib(EdgeWeightFormat::LowerDiagRow, 1.0);
        let expected = "NAME: My Route\nTYPE: TSP\nCOMMENT: My Route\nDIMENSION: 3\n\
                        EDGE_WEIGHT_TYPE: EXPLICIT\nEDGE_WEIGHT_FORMAT: LOWER_DIAG_ROW\n\
                        EDGE_WEIGHT_SECTION\n0\n10 0\n10 14 0\nEOF\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_full_matrix_with_scale() {
        let text = triangle().to_tsplib(EdgeWeightFormat::FullMatrix, 100.0);
        let rows: Vec<&str> = text
            .lines()
            .skip_while(|l| *l != "EDGE_WEIGHT_SECTION")
            .skip(1)
            .take_while(|l| *l != "EOF")
            .collect();

        assert_eq!(rows, vec!["0 1000 1000", "1000 0 1414", "1000 1414 0"]);
    }

    #[test]
    fn test_statistics() {
        let stats = triangle().statistics();
        assert_eq!(stats.dimension, 3);
        assert!((stats.max_distance - 200f64.sqrt()).abs() < 1e-9);
        assert!(stats.to_string().contains("Nodes: 3"));
    }
}
