//! Concorde, run as an external process.
//!
//! The instance is written as an explicit-matrix TSPLIB file into a fresh
//! scratch directory, Concorde is invoked as
//! `concorde [extra args] -x -o tour.sol tour.tsp` and the solution file is
//! read back. The solution file holds the dimension followed by the node
//! indices of the optimal tour, 0-based.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use super::TourSolver;
use crate::error::{Result, TourError};
use crate::instance::{EdgeWeightFormat, TspInstance};
use crate::tour::TourOrder;

/// Concorde invocation settings
#[derive(Debug, Clone)]
pub struct ConcordeConfig {
    /// Solver executable, looked up on PATH when not absolute
    pub executable: PathBuf,
    /// Arguments placed before the standard ones (e.g. `-s 99` for a fixed seed)
    pub extra_args: Vec<String>,
    /// Costs are multiplied by this before rounding to TSPLIB integers
    pub weight_scale: f64,
    pub edge_weight_format: EdgeWeightFormat,
}

impl Default for ConcordeConfig {
    fn default() -> Self {
        ConcordeConfig {
            executable: PathBuf::from("concorde"),
            extra_args: Vec::new(),
            weight_scale: 1.0,
            edge_weight_format: EdgeWeightFormat::LowerDiagRow,
        }
    }
}

pub struct ConcordeSolver {
    config: ConcordeConfig,
}

impl ConcordeSolver {
    pub fn new(config: ConcordeConfig) -> Self {
        ConcordeSolver { config }
    }
}

impl TourSolver for ConcordeSolver {
    fn solve(&self, instance: &TspInstance, start: usize) -> Result<TourOrder> {
        let work_dir = tempfile::Builder::new().prefix("optimal-tour").tempdir()?;
        let problem_file = work_dir.path().join("tour.tsp");
        let solution_file = work_dir.path().join("tour.sol");

        instance.write_tsplib(
            &problem_file,
            self.config.edge_weight_format,
            self.config.weight_scale,
        )?;

        log::debug!(
            "running {} {} -x -o {} {}",
            self.config.executable.display(),
            self.config.extra_args.join(" "),
            solution_file.display(),
            problem_file.display()
        );

        let out = Command::new(&self.config.executable)
            .args(&self.config.extra_args)
            .arg("-x")
            .arg("-o")
            .arg(&solution_file)
            .arg(&problem_file)
            .current_dir(work_dir.path())
            .output()
            .map_err(|e| {
                TourError::SolverInvocation(format!(
                    "cannot run {}: {}",
                    self.config.executable.display(),
                    e
                ))
            })?;

        if !out.status.success() {
            return Err(TourError::SolverInvocation(format!(
                "{} exited with {}\nSTDOUT:\n{}\nSTDERR:\n{}",
                self.config.executable.display(),
                out.status,
                String::from_utf8_lossy(&out.stdout),
                String::from_utf8_lossy(&out.stderr),
            )));
        }

        let text = fs::read_to_string(&solution_file).map_err(|e| {
            TourError::SolverInvocation(format!(
                "solution file {} unreadable: {}",
                solution_file.display(),
                e
            ))
        })?;
        let order = parse_solution(&text, instance.dimension)?;

        Ok(TourOrder::new(order, instance.dimension)?.starting_at(start))
    }

    fn name(&self) -> &str {
        "Concorde"
    }
}

/// Parse a Concorde solution file: the dimension, then one index per node.
pub fn parse_solution(text: &str, dimension: usize) -> Result<Vec<usize>> {
    let mut tokens = text.split_whitespace();

    let declared: usize = tokens
        .next()
        .ok_or_else(|| TourError::SolverInvocation("empty solution file".to_string()))?
        .parse()
        .map_err(|_| TourError::SolverInvocation("invalid solution dimension".to_string()))?;
    if declared != dimension {
        return Err(TourError::SolverInvocation(format!(
            "solution dimension {} does not match instance dimension {}",
            declared, dimension
        )));
    }

    tokens
        .map(|t| {
            t.parse::<usize>()
                .map_err(|_| TourError::SolverInvocation(format!("invalid tour node '{}'", t)))
        })
        .collect()
}
