//! Built-in tour solver, for when no external solver is installed.
//!
//! Nearest-neighbour construction from the start node followed by
//! best-improvement 2-opt. The first construction is deterministic; each
//! restart picks randomly among the three nearest unvisited nodes (seeded, so
//! runs are reproducible). The cheapest improved tour wins.

use std::collections::HashSet;

use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::TourSolver;
use crate::error::{Result, TourError};
use crate::instance::TspInstance;
use crate::tour::TourOrder;

/// Heuristic solver configuration
#[derive(Debug, Clone)]
pub struct HeuristicConfig {
    /// Randomized constructions tried after the deterministic one
    pub restarts: usize,
    /// Random seed
    pub seed: u64,
    /// Cap on 2-opt passes per tour
    pub max_passes: usize,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        HeuristicConfig {
            restarts: 8,
            seed: 42,
            max_passes: 1000,
        }
    }
}

pub struct HeuristicSolver {
    config: HeuristicConfig,
}

impl HeuristicSolver {
    pub fn new(config: HeuristicConfig) -> Self {
        HeuristicSolver { config }
    }

    fn find_nearest(
        &self,
        instance: &TspInstance,
        current: usize,
        visited: &HashSet<usize>,
        rng: Option<&mut ChaCha8Rng>,
    ) -> Option<usize> {
        let mut candidates: Vec<(usize, f64)> = (0..instance.dimension)
            .filter(|n| !visited.contains(n))
            .map(|n| (n, instance.distance(current, n)))
            .collect();

        if candidates.is_empty() {
            return None;
        }

        candidates.sort_by_key(|&(_, d)| OrderedFloat(d));

        match rng {
            Some(rng) if candidates.len() > 1 => {
                let top_k = candidates.len().min(3);
                Some(candidates[rng.gen_range(0..top_k)].0)
            }
            _ => Some(candidates[0].0),
        }
    }

    fn nearest_neighbor(
        &self,
        instance: &TspInstance,
        start: usize,
        mut rng: Option<&mut ChaCha8Rng>,
    ) -> Vec<usize> {
        let mut tour = vec![start];
        let mut visited = HashSet::new();
        visited.insert(start);

        let mut current = start;
        while let Some(next) = self.find_nearest(instance, current, &visited, rng.as_deref_mut()) {
            tour.push(next);
            visited.insert(next);
            current = next;
        }

        tour
    }

    /// Best-improvement 2-opt. Position 0 never moves, so the start node is kept.
    fn two_opt(&self, instance: &TspInstance, tour: &mut [usize]) -> bool {
        let n = tour.len();
        if n < 4 {
            return false;
        }

        let mut total_improved = false;
        for _ in 0..self.config.max_passes {
            let mut best_delta = -1e-9;
            let mut best_move = None;

            for i in 0..n - 2 {
                for j in i + 2..n {
                    if i == 0 && j == n - 1 {
                        continue; // Would just reverse the whole cycle
                    }
                    let (a, b) = (tour[i], tour[i + 1]);
                    let (c, d) = (tour[j], tour[(j + 1) % n]);
                    let delta = instance.distance(a, c) + instance.distance(b, d)
                        - instance.distance(a, b)
                        - instance.distance(c, d);

                    if delta < best_delta {
                        best_delta = delta;
                        best_move = Some((i, j));
                    }
                }
            }

            match best_move {
                Some((i, j)) => {
                    tour[i + 1..=j].reverse();
                    total_improved = true;
                }
                None => break,
            }
        }

        total_improved
    }
}

impl Default for HeuristicSolver {
    fn default() -> Self {
        Self::new(HeuristicConfig::default())
    }
}

impl TourSolver for HeuristicSolver {
    fn solve(&self, instance: &TspInstance, start: usize) -> Result<TourOrder> {
        if start >= instance.dimension {
            return Err(TourError::SolverInvocation(format!(
                "start node {} out of range 0..{}",
                start, instance.dimension
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let mut best = self.nearest_neighbor(instance, start, None);
        self.two_opt(instance, &mut best);
        let mut best_length = instance.tour_length(&best);

        for _ in 0..self.config.restarts {
            let mut tour = self.nearest_neighbor(instance, start, Some(&mut rng));
            self.two_opt(instance, &mut tour);
            let length = instance.tour_length(&tour);
            if length < best_length - 1e-9 {
                best = tour;
                best_length = length;
            }
        }

        log::debug!("heuristic tour length {:.2}", best_length);
        TourOrder::new(best, instance.dimension)
    }

    fn name(&self) -> &str {
        "NearestNeighbor+2-Opt"
    }
}
