//! Engine that replays archived solutions instead of solving.
//!
//! For an instance `dir/model_3.mps` the solution is read from
//! `dir/model_3.sol`. If that solution reports an infeasible model, the
//! certificate is read from `dir/model_3.ilp` when present.

use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, warn};

use super::highs::{self, ColumnSolution};
use super::instance::InstanceFile;
use super::{SolveOutcome, SolverEngine, SolverOptions};
use crate::error::EngineError;

/// Replays `.sol` files stored next to each instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayEngine;

impl ReplayEngine {
    pub fn new() -> Self {
        Self
    }
}

fn read_certificate(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "no certificate archived for infeasible window");
            String::new()
        }
    }
}

impl SolverEngine<InstanceFile> for ReplayEngine {
    type Solution = ColumnSolution;

    fn solve(
        &mut self,
        model: &InstanceFile,
        _options: &SolverOptions,
    ) -> Result<SolveOutcome<ColumnSolution>, EngineError> {
        let solution_path = model.path.with_extension("sol");
        debug!(window = model.window, path = %solution_path.display(), "replaying solution");

        let started = Instant::now();
        let text = fs::read_to_string(&solution_path)?;
        let file = highs::parse_solution(&text)?;
        let runtime_secs = started.elapsed().as_secs_f64();

        let certificate_path = model.path.with_extension("ilp");
        highs::into_outcome(file, runtime_secs, || read_certificate(&certificate_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(dir: &Path, sol: &str) -> InstanceFile {
        let path = dir.join("demo_0.mps");
        fs::write(&path, "NAME demo\nENDATA\n").expect("mps");
        fs::write(dir.join("demo_0.sol"), sol).expect("sol");
        InstanceFile { window: 0, path }
    }

    #[test]
    fn replays_feasible_solution() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = instance(
            dir.path(),
            "Model status\nOptimal\n# Primal solution values\nFeasible\n# Columns 1\np[g1,0] 5\n",
        );
        let outcome = ReplayEngine::new()
            .solve(&model, &SolverOptions::default())
            .expect("replay");
        assert!(matches!(outcome, SolveOutcome::Solved(ref s) if s.num_columns() == 1));
    }

    #[test]
    fn infeasible_solution_reads_archived_certificate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = instance(dir.path(), "Model status\nInfeasible\n");
        fs::write(dir.path().join("demo_0.ilp"), "\\ IIS\nbalance_0: p_g1_0 >= 500\n").expect("ilp");

        match ReplayEngine::new().solve(&model, &SolverOptions::default()) {
            Ok(SolveOutcome::Infeasible(inf)) => assert!(inf.certificate.contains("balance_0")),
            other => panic!("expected infeasible, got {other:?}"),
        }
    }

    #[test]
    fn infeasible_without_certificate_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = instance(dir.path(), "Model status\nInfeasible\n");
        match ReplayEngine::new().solve(&model, &SolverOptions::default()) {
            Ok(SolveOutcome::Infeasible(inf)) => assert!(inf.certificate.is_empty()),
            other => panic!("expected infeasible, got {other:?}"),
        }
    }

    #[test]
    fn missing_solution_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = InstanceFile {
            window: 0,
            path: dir.path().join("demo_0.mps"),
        };
        let err = ReplayEngine::new().solve(&model, &SolverOptions::default());
        assert!(matches!(err, Err(EngineError::Io(_))));
    }
}
