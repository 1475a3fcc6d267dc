//! Model builder and solver engine seams.
//!
//! The orchestrator and extractor depend only on the traits in this module.
//! Concrete engines adapt their native result shape to [`SolutionSource`]:
//!
//! - [`solution::NamedSolution`] for in-process engines that report parallel
//!   name and value arrays.
//! - [`highs::ColumnSolution`] for solutions read back from a HiGHS solution
//!   file, produced by [`external::ExternalSolver`] or [`replay::ReplayEngine`].

use std::io;
use std::path::Path;

use crate::error::{BuildError, EngineError};
use crate::record::InitialConditions;

pub mod external;
/// HiGHS solution-file format.
pub mod highs;
/// Archived per-window MPS instances.
pub mod instance;
pub mod replay;
pub mod solution;

/// Solver limits passed through to the builder and the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolverOptions {
    /// Relative MIP optimality gap.
    pub mip_gap: Option<f64>,
    /// Wall-clock limit per window in seconds.
    pub time_limit_secs: Option<f64>,
}

/// A built optimization model for one window.
pub trait Model {
    /// Writes the model in MPS format to `path`.
    fn write_mps(&self, path: &Path) -> io::Result<()>;
}

/// Produces a model per window from the previous window's state.
///
/// The orchestrator calls [`ModelBuilder::build`] for the first window of a
/// run and [`ModelBuilder::update`] for every later one.
pub trait ModelBuilder {
    type Model: Model;

    /// Builds the model from scratch.
    fn build(
        &mut self,
        window: usize,
        initial: &InitialConditions,
        options: &SolverOptions,
    ) -> Result<Self::Model, BuildError>;

    /// Updates the model for the next window of the same run.
    fn update(
        &mut self,
        window: usize,
        initial: &InitialConditions,
        options: &SolverOptions,
    ) -> Result<Self::Model, BuildError>;
}

/// Solved variable values and the time spent solving.
pub trait SolutionSource {
    /// Every variable as a `(name, value)` pair.
    fn variables(&self) -> Box<dyn Iterator<Item = (&str, f64)> + '_>;

    /// Solve time in seconds.
    fn runtime_secs(&self) -> f64;
}

/// Solver evidence that a window has no feasible solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Infeasibility {
    /// Solve time in seconds, spent before infeasibility was proven.
    pub runtime_secs: f64,
    /// Evidence text. The replay engine passes the archived irreducible
    /// infeasible subsystem (`.ilp`); the external solver passes its
    /// combined stdout and stderr, which is a solver log and not a
    /// subsystem certificate.
    pub certificate: String,
}

/// Result of solving one window.
#[derive(Debug)]
pub enum SolveOutcome<S> {
    Solved(S),
    Infeasible(Infeasibility),
}

impl<S: SolutionSource> SolveOutcome<S> {
    /// Solve time regardless of feasibility.
    pub fn runtime_secs(&self) -> f64 {
        match self {
            Self::Solved(s) => s.runtime_secs(),
            Self::Infeasible(i) => i.runtime_secs,
        }
    }
}

/// Solves window models.
pub trait SolverEngine<M: Model> {
    type Solution: SolutionSource;

    /// Solves `model`. Blocks until the engine finishes.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the engine fails without a verdict.
    /// A proven infeasible model is not an error.
    fn solve(
        &mut self,
        model: &M,
        options: &SolverOptions,
    ) -> Result<SolveOutcome<Self::Solution>, EngineError>;
}
