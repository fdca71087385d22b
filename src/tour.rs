//! Tour representation and interpretation.
//!
//! A [`TourOrder`] is a permutation of waypoint indices read as a Hamiltonian
//! cycle: the last node connects back to the first. Construction validates the
//! permutation so that everything downstream can rely on it.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Result, TourError};
use crate::waypoint::Waypoint;

/// A visiting order over `0..n`, each index exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TourOrder {
    order: Vec<usize>,
}

impl TourOrder {
    /// Validate `order` as a permutation of `0..dimension`.
    ///
    /// Solver output is untrusted: a wrong length, an out-of-range index or a
    /// repeated index is a solver failure.
    pub fn new(order: Vec<usize>, dimension: usize) -> Result<Self> {
        if order.len() != dimension {
            return Err(TourError::SolverInvocation(format!(
                "tour has {} nodes, expected {}",
                order.len(),
                dimension
            )));
        }

        let mut seen = HashSet::with_capacity(dimension);
        for &node in &order {
            if node >= dimension {
                return Err(TourError::SolverInvocation(format!(
                    "tour node {} out of range 0..{}",
                    node, dimension
                )));
            }
            if !seen.insert(node) {
                return Err(TourError::SolverInvocation(format!("tour visits node {} twice", node)));
            }
        }

        Ok(TourOrder { order })
    }

    /// Rotate the cycle so that `start` comes first. The cycle itself is unchanged.
    pub fn starting_at(mut self, start: usize) -> Self {
        if let Some(pos) = self.position(start) {
            self.order.rotate_left(pos);
        }
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// First node of the cycle
    pub fn start(&self) -> Option<usize> {
        self.order.first().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Get the position of a node in the tour
    pub fn position(&self, node: usize) -> Option<usize> {
        self.order.iter().position(|&n| n == node)
    }

    /// Get the node at a given position (circular)
    pub fn node_at(&self, pos: usize) -> usize {
        self.order[pos % self.order.len()]
    }

    /// The cycle written out with the first node repeated at the end
    pub fn closed(&self) -> Vec<usize> {
        let mut closed = self.order.clone();
        closed.extend(self.start());
        closed
    }

    /// Reorder `waypoints` along the tour: `ordered[k] = waypoints[tour[k]]`.
    ///
    /// The tour must have been built for exactly this waypoint set.
    pub fn reorder(&self, waypoints: &[Waypoint]) -> Result<Vec<Waypoint>> {
        if waypoints.len() != self.order.len() {
            return Err(TourError::SolverInvocation(format!(
                "tour covers {} nodes but there are {} waypoints",
                self.order.len(),
                waypoints.len()
            )));
        }
        Ok(self.order.iter().map(|&i| waypoints[i].clone()).collect())
    }
}

impl std::fmt::Display for TourOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nodes = self.closed().iter().map(|n| n.to_string()).collect::<Vec<_>>();
        f.write_str(&nodes.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waypoint::tests::waypoints;

    #[test]
    fn test_rejects_non_permutations() {
        assert!(TourOrder::new(vec![0, 1], 3).is_err());
        assert!(TourOrder::new(vec![0, 1, 3], 3).is_err());
        assert!(matches!(
            TourOrder::new(vec![0, 1, 1], 3),
            Err(TourError::SolverInvocation(_))
        ));
        assert!(TourOrder::new(vec![2, 0, 1], 3).is_ok());
    }

    #[test]
    fn test_starting_at_rotates_cycle() {
        let tour = TourOrder::new(vec![2, 3, 0, 1], 4).unwrap().starting_at(0);
        assert_eq!(tour.as_slice(), &[0, 1, 2, 3]);
        assert_eq!(tour.closed(), vec![0, 1, 2, 3, 0]);
        assert_eq!(tour.node_at(5), 1);
        assert_eq!(tour.to_string(), "0 -> 1 -> 2 -> 3 -> 0");
    }

    #[test]
    fn test_reorder_is_a_permutation() {
        let wps = waypoints(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);
        let tour = TourOrder::new(vec![0, 3, 1, 4, 2], 5).unwrap();
        let ordered = tour.reorder(&wps).unwrap();

        assert_eq!(ordered.len(), wps.len());
        let indices: Vec<usize> = ordered.iter().map(|w| w.index).collect();
        assert_eq!(indices, vec![0, 3, 1, 4, 2]);
        assert_eq!(ordered[1].x(), 3.0);

        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_reorder_rejects_other_waypoint_set() {
        let wps = waypoints(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let tour = TourOrder::new(vec![0, 1], 2).unwrap();
        assert!(tour.reorder(&wps).is_err());
    }
}
