//! Rolling-horizon orchestrator that drives builder, solver, and extractor.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use super::clock::WindowSlot;
use super::outcome::{InfeasibleWindow, RunOutcome};
use super::types::SimConfig;
use crate::error::SimError;
use crate::record::{Extractor, InitialConditions, SimulationRecord};
use crate::solver::instance::instance_file_name;
use crate::solver::{Model, ModelBuilder, SolutionSource, SolveOutcome, SolverEngine};

/// Rolling-horizon simulator owning the builder, the solver, and the extractor.
///
/// Generic over the builder `B` and the engine `S` for static dispatch.
/// Windows are solved strictly in sequence; each run owns its own record.
pub struct Simulator<B, S> {
    config: SimConfig,
    builder: B,
    solver: S,
    extractor: Extractor,
    model_export: Option<PathBuf>,
}

impl<B, S> Simulator<B, S>
where
    B: ModelBuilder,
    S: SolverEngine<B::Model>,
{
    /// Creates a new simulator.
    ///
    /// # Arguments
    ///
    /// * `config` - Window length, execution mode, and solver limits
    /// * `builder` - Produces the model of each window
    /// * `solver` - Solves window models
    /// * `extractor` - Turns solutions into records and next-window state
    ///
    /// # Panics
    ///
    /// Panics if `config` and the extractor disagree on the window length.
    pub fn new(config: SimConfig, builder: B, solver: S, extractor: Extractor) -> Self {
        assert_eq!(
            config.window_hours,
            extractor.params().window_hours,
            "simulator and extractor window lengths differ"
        );
        Self {
            config,
            builder,
            solver,
            extractor,
            model_export: None,
        }
    }

    /// Also writes every window's model to `dir` as `{model}_{window}.mps`.
    pub fn with_model_export(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_export = Some(dir.into());
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Runs the rolling horizon.
    ///
    /// The first window is built from `initial_conditions`; every later one
    /// is updated from the state derived out of its predecessor. The run
    /// stops at the first infeasible or failed window without retrying.
    ///
    /// The returned outcome always carries the record accumulated so far.
    /// Infeasibility is reported through [`RunOutcome::InfeasibleHalt`],
    /// builder, engine, and extractor errors through [`RunOutcome::Failed`].
    ///
    /// # Arguments
    ///
    /// * `requested_steps` - Windows to solve in continuous mode
    /// * `initial_conditions` - Boundary state for the first window
    /// * `simulated_day` - Window index in single-step mode
    pub fn run(
        &mut self,
        requested_steps: usize,
        initial_conditions: InitialConditions,
        simulated_day: usize,
    ) -> RunOutcome<B::Model> {
        let window_hours = self.config.window_hours;
        let mut clock = self.config.clock(requested_steps, simulated_day);
        let windows_expected = clock.total();
        let mut record = SimulationRecord::new(window_hours);
        let mut initial = initial_conditions;

        info!(
            mode = ?self.config.mode,
            windows = windows_expected,
            window_hours,
            "starting rolling horizon"
        );

        while let Some(slot) = clock.tick() {
            match self.step(slot, &initial, &mut record) {
                Ok(WindowStep::Solved(next)) => initial = next,
                Ok(WindowStep::Infeasible(diagnostics)) => {
                    return RunOutcome::InfeasibleHalt {
                        record,
                        diagnostics,
                        windows_expected,
                    };
                }
                Err(error) => {
                    error!(
                        window = slot.index,
                        windows_solved = record.windows().len(),
                        %error,
                        "window failed, halting run"
                    );
                    return RunOutcome::Failed {
                        record,
                        error,
                        windows_expected,
                    };
                }
            }
        }

        info!(
            windows = record.windows().len(),
            total_solve_secs = record.runtimes().total_secs(),
            "rolling horizon complete"
        );
        RunOutcome::Completed {
            record,
            windows_expected,
        }
    }

    /// Builds, solves, and ingests one window.
    fn step(
        &mut self,
        slot: WindowSlot,
        initial: &InitialConditions,
        record: &mut SimulationRecord,
    ) -> Result<WindowStep<B::Model>, SimError> {
        let window = slot.index;
        let options = self.config.options;
        let built = if slot.is_first() {
            self.builder.build(window, initial, &options)
        } else {
            self.builder.update(window, initial, &options)
        };
        let model = built.map_err(|source| SimError::Build { window, source })?;

        if let Some(dir) = &self.model_export {
            let path = dir.join(instance_file_name(
                &self.extractor.params().model_name,
                window,
            ));
            fs::create_dir_all(dir)
                .and_then(|()| model.write_mps(&path))
                .map_err(|source| SimError::ModelExport {
                    window,
                    path: path.clone(),
                    source,
                })?;
            debug!(window, path = %path.display(), "exported window model");
        }

        let outcome = self
            .solver
            .solve(&model, &options)
            .map_err(|source| SimError::Engine { window, source })?;

        match outcome {
            SolveOutcome::Solved(solution) => {
                let next = self
                    .extractor
                    .ingest(&solution, window, record)
                    .map_err(|source| SimError::Extract { window, source })?;
                info!(
                    window,
                    iteration = slot.iteration,
                    runtime_secs = solution.runtime_secs(),
                    "window solved"
                );
                Ok(WindowStep::Solved(next))
            }
            SolveOutcome::Infeasible(infeasibility) => {
                record.record_runtime(infeasibility.runtime_secs);
                warn!(
                    window,
                    iteration = slot.iteration,
                    runtime_secs = infeasibility.runtime_secs,
                    "window infeasible, halting run"
                );
                Ok(WindowStep::Infeasible(InfeasibleWindow {
                    window,
                    window_hours: self.config.window_hours,
                    certificate: infeasibility.certificate,
                    model,
                }))
            }
        }
    }
}

/// What one window contributed to the run.
enum WindowStep<M> {
    /// Initial conditions for the next window.
    Solved(InitialConditions),
    Infeasible(InfeasibleWindow<M>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::path::Path;

    use crate::error::{BuildError, EngineError};
    use crate::record::NoiseFilter;
    use crate::sim::types::ExecutionMode;
    use crate::solver::solution::NamedSolution;
    use crate::solver::{Infeasibility, SolverOptions};
    use crate::system::{SystemParams, ThermalUnit};

    const T: usize = 4;

    #[derive(Debug, Clone, PartialEq)]
    struct Tagged(usize);

    impl Model for Tagged {
        fn write_mps(&self, path: &Path) -> io::Result<()> {
            fs::write(path, format!("NAME window{}\nENDATA\n", self.0))
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, usize, Vec<(String, u32)>)>,
    }

    impl ModelBuilder for Recorder {
        type Model = Tagged;

        fn build(
            &mut self,
            window: usize,
            initial: &InitialConditions,
            _options: &SolverOptions,
        ) -> Result<Tagged, BuildError> {
            self.calls.push(("build", window, min_on(initial)));
            Ok(Tagged(window))
        }

        fn update(
            &mut self,
            window: usize,
            initial: &InitialConditions,
            _options: &SolverOptions,
        ) -> Result<Tagged, BuildError> {
            self.calls.push(("update", window, min_on(initial)));
            Ok(Tagged(window))
        }
    }

    fn min_on(initial: &InitialConditions) -> Vec<(String, u32)> {
        initial.min_on.iter().map(|(u, v)| (u.clone(), *v)).collect()
    }

    struct Scripted(VecDeque<Option<NamedSolution>>);

    impl SolverEngine<Tagged> for Scripted {
        type Solution = NamedSolution;

        fn solve(
            &mut self,
            _model: &Tagged,
            _options: &SolverOptions,
        ) -> Result<SolveOutcome<NamedSolution>, EngineError> {
            match self.0.pop_front() {
                Some(Some(s)) => Ok(SolveOutcome::Solved(s)),
                Some(None) => Ok(SolveOutcome::Infeasible(Infeasibility {
                    runtime_secs: 0.25,
                    certificate: "iis".into(),
                })),
                None => Err(EngineError::NoSolution {
                    status: "script exhausted".into(),
                }),
            }
        }
    }

    fn window(start_hour: Option<usize>) -> NamedSolution {
        let mut s = NamedSolution::new(1.0);
        for h in 0..T {
            let started = start_hour == Some(h);
            s.push(format!("p[g1,{h}]"), 10.0);
            s.push(format!("status[g1,{h}]"), 1.0);
            s.push(format!("start[g1,{h}]"), if started { 1.0 } else { 0.0 });
            s.push(format!("shut[g1,{h}]"), 0.0);
        }
        s
    }

    fn simulator(mode: ExecutionMode, script: Vec<Option<NamedSolution>>) -> Simulator<Recorder, Scripted> {
        let params = SystemParams::new("demo", T, vec![ThermalUnit::new("g1", 3, 1)]);
        Simulator::new(
            SimConfig::new(T, mode, SolverOptions::default()),
            Recorder::default(),
            Scripted(script.into()),
            Extractor::new(params, NoiseFilter::default()),
        )
    }

    #[test]
    fn first_window_builds_and_later_windows_update() {
        let mut sim = simulator(ExecutionMode::Continuous, vec![Some(window(None)); 3]);
        let outcome = sim.run(3, InitialConditions::default(), 0);
        assert!(outcome.is_complete());

        let kinds: Vec<(&str, usize)> = sim.builder().calls.iter().map(|(k, w, _)| (*k, *w)).collect();
        assert_eq!(kinds, vec![("build", 0), ("update", 1), ("update", 2)]);
    }

    #[test]
    fn derived_state_feeds_next_window() {
        let mut sim = simulator(
            ExecutionMode::Continuous,
            vec![Some(window(Some(2))), Some(window(None))],
        );
        sim.run(2, InitialConditions::default(), 0);
        // started at local hour 2 of 4 with min up 3: two hours left
        assert_eq!(sim.builder().calls[1].2, vec![("g1".to_string(), 2)]);
    }

    #[test]
    fn infeasible_window_halts_with_model() {
        let mut sim = simulator(ExecutionMode::Continuous, vec![Some(window(None)), None, Some(window(None))]);
        let outcome = sim.run(3, InitialConditions::default(), 0);

        let diag = outcome.infeasible_window().expect("halted");
        assert_eq!(diag.window, 1);
        assert_eq!(diag.model, Tagged(1));
        assert_eq!(outcome.windows_solved(), 1);
        assert_eq!(outcome.record().runtimes().as_slice(), &[1.0, 0.25]);
        assert_eq!(sim.builder().calls.len(), 2);
    }

    #[test]
    fn single_step_uses_day_offset() {
        let mut sim = simulator(ExecutionMode::SingleStep, vec![Some(window(None))]);
        let outcome = sim.run(10, InitialConditions::default(), 5);
        assert_eq!(outcome.record().windows(), &[5]);
        assert_eq!(outcome.record().hours(), vec![20, 21, 22, 23]);
        assert_eq!(sim.builder().calls[0].0, "build");
    }

    #[test]
    fn engine_failure_names_window() {
        let mut sim = simulator(ExecutionMode::Continuous, vec![Some(window(None))]);
        let outcome = sim.run(2, InitialConditions::default(), 0);
        assert!(matches!(outcome.error(), Some(SimError::Engine { window: 1, .. })));
    }

    #[test]
    fn engine_failure_keeps_solved_windows() {
        let script = vec![Some(window(Some(1))), Some(window(None))];
        let mut sim = simulator(ExecutionMode::Continuous, script);
        let outcome = sim.run(5, InitialConditions::default(), 0);

        assert!(!outcome.is_complete());
        assert!(outcome.infeasible_window().is_none());
        assert_eq!(outcome.windows_solved(), 2);
        assert_eq!(outcome.windows_expected(), 5);
        assert_eq!(outcome.record().hours(), (0..2 * T).collect::<Vec<_>>());
        assert_eq!(outcome.record().runtimes().as_slice(), &[1.0, 1.0]);
        match outcome {
            RunOutcome::Failed { error, .. } => {
                assert!(matches!(
                    error,
                    SimError::Engine {
                        window: 2,
                        source: EngineError::NoSolution { .. }
                    }
                ));
            }
            other => panic!("expected failed run, got {other:?}"),
        }
    }

    #[test]
    fn malformed_name_is_surfaced() {
        let mut bad = window(None);
        bad.push("p[g1".into(), 1.0);
        let mut sim = simulator(ExecutionMode::Continuous, vec![Some(bad)]);
        let outcome = sim.run(1, InitialConditions::default(), 0);
        assert!(matches!(outcome.error(), Some(SimError::Extract { window: 0, .. })));
        assert_eq!(outcome.windows_solved(), 0);
    }

    #[test]
    fn exports_each_window_model() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sim = simulator(ExecutionMode::Continuous, vec![Some(window(None)); 2])
            .with_model_export(dir.path().join("demo_4_instances"));
        sim.run(2, InitialConditions::default(), 0);
        let exported = dir.path().join("demo_4_instances").join("demo_1.mps");
        assert_eq!(
            fs::read_to_string(exported).expect("exported"),
            "NAME window1\nENDATA\n"
        );
    }
}
