//! Fallback path through an external solver executable.
//!
//! The model is exported to a temporary MPS file, handed to the executable
//! together with a temporary options file, and the solution file it writes is
//! read back. All three interchange files are removed when the solve returns,
//! on success and on every error path.
//!
//! An infeasible verdict carries the solver's console output as its
//! certificate. The driver does not compute an infeasible subsystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::highs::{self, ColumnSolution};
use super::{Model, SolveOutcome, SolverEngine, SolverOptions};
use crate::error::EngineError;

/// Default executable.
pub const DEFAULT_PROGRAM: &str = "highs";

/// Default argument template for the HiGHS command-line driver.
pub const DEFAULT_ARGS: [&str; 6] = [
    "--model_file",
    "{model}",
    "--solution_file",
    "{solution}",
    "--options_file",
    "{options}",
];

/// A temporary interchange file that is removed when dropped.
///
/// Removal failures are logged and never returned.
struct ScopedArtifact {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl ScopedArtifact {
    fn create(suffix: &str) -> std::io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("horizon-sim-")
            .suffix(suffix)
            .tempfile()?;
        let path = file.path().to_path_buf();
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedArtifact {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.close() {
                warn!(path = %self.path.display(), error = %e, "failed to remove solver interchange file");
            }
        }
    }
}

/// Solves models by running an external executable.
///
/// Arguments may contain the placeholders `{model}`, `{solution}`, and
/// `{options}`, replaced by the interchange file paths.
#[derive(Debug, Clone)]
pub struct ExternalSolver {
    program: String,
    args: Vec<String>,
}

impl Default for ExternalSolver {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_ARGS.iter().map(|a| a.to_string()).collect())
    }
}

impl ExternalSolver {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn render_args(&self, model: &Path, solution: &Path, options: &Path) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{model}", &model.to_string_lossy())
                    .replace("{solution}", &solution.to_string_lossy())
                    .replace("{options}", &options.to_string_lossy())
            })
            .collect()
    }
}

impl<M: Model> SolverEngine<M> for ExternalSolver {
    type Solution = ColumnSolution;

    fn solve(
        &mut self,
        model: &M,
        options: &SolverOptions,
    ) -> Result<SolveOutcome<ColumnSolution>, EngineError> {
        let model_file = ScopedArtifact::create(".mps")?;
        let solution_file = ScopedArtifact::create(".sol")?;
        let options_file = ScopedArtifact::create(".opt")?;

        model.write_mps(model_file.path())?;
        fs::write(options_file.path(), highs::options_file(options))?;

        let args = self.render_args(model_file.path(), solution_file.path(), options_file.path());
        debug!(program = %self.program, ?args, "starting external solver");

        let started = Instant::now();
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        let runtime_secs = started.elapsed().as_secs_f64();

        if !output.status.success() {
            return Err(EngineError::ProcessFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = fs::read_to_string(solution_file.path())?;
        let file = highs::parse_solution(&text)?;
        info!(
            program = %self.program,
            status = %file.model_status,
            runtime_secs,
            "external solve finished"
        );

        highs::into_outcome(file, runtime_secs, || {
            let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
            log.push_str(&String::from_utf8_lossy(&output.stderr));
            log
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io;

    struct TextModel(&'static str);

    impl Model for TextModel {
        fn write_mps(&self, path: &Path) -> io::Result<()> {
            fs::write(path, self.0)
        }
    }

    fn shell(script: &str) -> ExternalSolver {
        ExternalSolver::new(
            "sh",
            vec![
                "-c".into(),
                script.into(),
                "solver".into(),
                "{model}".into(),
                "{solution}".into(),
                "{options}".into(),
            ],
        )
    }

    #[test]
    fn placeholders_are_rendered() {
        let solver = ExternalSolver::default();
        let args = solver.render_args(Path::new("/m.mps"), Path::new("/s.sol"), Path::new("/o.opt"));
        assert_eq!(
            args,
            vec!["--model_file", "/m.mps", "--solution_file", "/s.sol", "--options_file", "/o.opt"]
        );
    }

    #[test]
    fn reads_back_solution_written_by_executable() {
        let mut solver = shell(
            "grep -q ENDATA \"$1\" && printf 'Model status\\nOptimal\\n\\n# Primal solution values\\nFeasible\\nObjective 3\\n# Columns 1\\np[g1,0] 3\\n' > \"$2\"",
        );
        let outcome = solver
            .solve(&TextModel("NAME t\nENDATA\n"), &SolverOptions::default())
            .expect("solve");
        match outcome {
            SolveOutcome::Solved(s) => {
                assert_eq!(s.num_columns(), 1);
                assert_eq!(s.objective(), Some(3.0));
            }
            SolveOutcome::Infeasible(_) => panic!("expected solved"),
        }
    }

    #[test]
    fn options_file_reaches_executable() {
        let mut solver = shell(
            "grep -q 'mip_rel_gap = 0.01' \"$3\" || exit 9; printf 'Model status\\nOptimal\\n# Primal solution values\\nFeasible\\n# Columns 0\\n' > \"$2\"",
        );
        let options = SolverOptions {
            mip_gap: Some(0.01),
            time_limit_secs: None,
        };
        assert!(solver.solve(&TextModel("ENDATA\n"), &options).is_ok());
    }

    #[test]
    fn nonzero_exit_is_process_failure() {
        let mut solver = shell("echo license expired >&2; exit 3");
        let err = solver.solve(&TextModel("ENDATA\n"), &SolverOptions::default());
        match err {
            Err(EngineError::ProcessFailed { code, stderr }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "license expired");
            }
            other => panic!("expected process failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let mut solver = ExternalSolver::new("horizon-sim-no-such-solver", Vec::new());
        let err = solver.solve(&TextModel("ENDATA\n"), &SolverOptions::default());
        assert!(matches!(err, Err(EngineError::Spawn { .. })));
    }

    #[test]
    fn artifact_is_removed_on_drop() {
        let artifact = ScopedArtifact::create(".mps").expect("create");
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        drop(artifact);
        assert!(!path.exists());
    }
}
