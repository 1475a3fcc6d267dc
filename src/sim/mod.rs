/// Window clock for the orchestration loop.
pub mod clock;
pub mod engine;
/// Run outcomes and infeasibility diagnostics.
pub mod outcome;
pub mod types;

pub use engine::Simulator;
pub use outcome::{DiagnosticBundle, InfeasibleWindow, RunOutcome};
pub use types::{ExecutionMode, SimConfig};
