//! Tour solvers.
//!
//! The rest of the pipeline only relies on the [`TourSolver`] contract:
//! a symmetric instance and a start node go in, a tour starting at that node
//! comes out. Any exact or approximate symmetric TSP solver fits.

pub mod concorde;
pub mod heuristic;

use crate::error::Result;
use crate::instance::TspInstance;
use crate::tour::TourOrder;

pub use concorde::{ConcordeConfig, ConcordeSolver};
pub use heuristic::{HeuristicConfig, HeuristicSolver};

pub trait TourSolver {
    /// Solve `instance`; the returned tour starts at `start`.
    fn solve(&self, instance: &TspInstance, start: usize) -> Result<TourOrder>;
    fn name(&self) -> &str;
}

impl<T: TourSolver + ?Sized> TourSolver for Box<T> {
    fn solve(&self, instance: &TspInstance, start: usize) -> Result<TourOrder> {
        (**self).solve(instance, start)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
