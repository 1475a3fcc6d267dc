//! Rolling-horizon unit-commitment simulator.
//!
//! A long planning horizon is split into fixed-length windows. Each window is
//! solved as its own optimization subproblem and the resulting unit state is
//! carried into the next window.

/// Command-line options and their overrides onto the run configuration.
pub mod cli;
/// TOML run configuration and validation.
pub mod config;
/// Error types shared across the crate.
pub mod error;
/// Persistence of the accumulated simulation record.
pub mod io;
/// Solver-output records, noise repair, and initial-condition derivation.
pub mod record;
/// Window orchestration loop and run outcomes.
pub mod sim;
/// Model builder and solver engine seams, solution adapters, and engines.
pub mod solver;
/// Static system parameters: thermal units and window length.
pub mod system;
