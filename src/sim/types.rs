//! Core orchestration types: run configuration and execution modes.

use serde::Deserialize;

use super::clock::WindowClock;
use crate::solver::SolverOptions;

/// Hours in a simulated year; caps the number of continuous windows.
pub const YEAR_HOURS: usize = 8760;

/// How many windows a run solves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Consecutive windows from the start of the horizon.
    #[default]
    Continuous,
    /// One window at a given day offset.
    SingleStep,
}

/// Orchestrator configuration.
///
/// # Examples
///
/// ```
/// use horizon_sim::sim::types::{ExecutionMode, SimConfig};
/// use horizon_sim::solver::SolverOptions;
///
/// let cfg = SimConfig::new(24, ExecutionMode::Continuous, SolverOptions::default());
/// assert_eq!(cfg.window_count(400), 365);
/// assert_eq!(cfg.window_count(3), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Hours per window (`T`).
    pub window_hours: usize,
    pub mode: ExecutionMode,
    pub options: SolverOptions,
}

impl SimConfig {
    /// Creates a new orchestrator configuration.
    ///
    /// # Panics
    ///
    /// Panics if `window_hours` is zero.
    pub fn new(window_hours: usize, mode: ExecutionMode, options: SolverOptions) -> Self {
        assert!(window_hours > 0, "window_hours must be > 0");
        Self {
            window_hours,
            mode,
            options,
        }
    }

    /// Number of windows a run will attempt.
    ///
    /// Always 1 in single-step mode. In continuous mode the request is capped
    /// at the number of whole windows in a year.
    pub fn window_count(&self, requested_steps: usize) -> usize {
        match self.mode {
            ExecutionMode::SingleStep => 1,
            ExecutionMode::Continuous => requested_steps.min(YEAR_HOURS / self.window_hours),
        }
    }

    /// Clock handing out the windows of one run.
    ///
    /// Single-step runs solve window `simulated_day`. Continuous runs always
    /// start at window 0 and ignore the day offset.
    pub fn clock(&self, requested_steps: usize, simulated_day: usize) -> WindowClock {
        match self.mode {
            ExecutionMode::SingleStep => WindowClock::single(simulated_day),
            ExecutionMode::Continuous => WindowClock::continuous(self.window_count(requested_steps)),
        }
    }
}
