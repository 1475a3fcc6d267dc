//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

use horizon_sim::error::{BuildError, EngineError};
use horizon_sim::record::{Extractor, InitialConditions, NoiseFilter};
use horizon_sim::sim::{ExecutionMode, SimConfig, Simulator};
use horizon_sim::solver::solution::NamedSolution;
use horizon_sim::solver::{
    Infeasibility, Model, ModelBuilder, SolveOutcome, SolverEngine, SolverOptions,
};
use horizon_sim::system::{SystemParams, ThermalUnit};

/// Window length used across integration tests.
pub const T: usize = 24;

/// Two thermal units: `g1` (up 5, down 3) and `g2` (up 2, down 2).
pub fn params() -> SystemParams {
    SystemParams::new(
        "demo",
        T,
        vec![ThermalUnit::new("g1", 5, 3), ThermalUnit::new("g2", 2, 2)],
    )
}

pub fn extractor() -> Extractor {
    Extractor::new(params(), NoiseFilter::default())
}

/// Commitment events of one window.
#[derive(Debug, Clone, Default)]
pub struct WindowPlan {
    /// `(unit, local hour)` pairs with a startup.
    pub startups: Vec<(&'static str, usize)>,
    /// `(unit, local hour)` pairs with a shutdown.
    pub shutdowns: Vec<(&'static str, usize)>,
}

/// Variable `(name, value)` pairs of a solved window.
///
/// Binary values carry solver noise within tolerance, the `a -> b` flow is
/// 5e-5 at hour 0 and 0.6 afterwards, and system reserve is 10 everywhere.
pub fn window_variables(plan: &WindowPlan) -> Vec<(String, f64)> {
    let mut vars = Vec::new();
    for unit in ["g1", "g2"] {
        for h in 0..T {
            let started = plan.startups.contains(&(unit, h));
            let shut = plan.shutdowns.contains(&(unit, h));
            vars.push((format!("p[{unit},{h}]"), 50.0 + h as f64));
            vars.push((format!("status[{unit},{h}]"), 0.99997));
            vars.push((format!("start[{unit},{h}]"), if started { 1.00002 } else { 3e-6 }));
            vars.push((format!("shut[{unit},{h}]"), if shut { 0.99999 } else { -2e-6 }));
        }
    }
    for h in 0..T {
        vars.push((format!("flow[a,b,{h}]"), if h == 0 { 5e-5 } else { 0.6 }));
        vars.push((format!("sys_spin[{h}]"), 10.0));
    }
    vars
}

pub fn solution(plan: &WindowPlan, runtime_secs: f64) -> NamedSolution {
    let (names, values) = window_variables(plan).into_iter().unzip();
    NamedSolution::from_attributes(names, values, runtime_secs)
}

/// Renders window variables as a HiGHS raw solution file.
pub fn highs_solution(plan: &WindowPlan) -> String {
    let vars = window_variables(plan);
    let mut text = format!(
        "Model status\nOptimal\n\n# Primal solution values\nFeasible\nObjective 1000\n# Columns {}\n",
        vars.len()
    );
    for (name, value) in vars {
        text.push_str(&format!("{name} {value}\n"));
    }
    text.push_str("# Rows 0\n");
    text
}

pub const HIGHS_INFEASIBLE: &str = "Model status\nInfeasible\n\n# Primal solution values\nNone\n";

/// Writes `{model}_{window}.mps` with a `NAME` line naming the window.
pub fn write_instance(dir: &Path, model: &str, window: usize) {
    fs::create_dir_all(dir).expect("instance dir");
    fs::write(
        dir.join(format!("{model}_{window}.mps")),
        format!("NAME {model}_{window}\nROWS\n N obj\nENDATA\n"),
    )
    .expect("write instance");
}

/// A model that only remembers its window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowModel(pub usize);

impl Model for WindowModel {
    fn write_mps(&self, path: &Path) -> io::Result<()> {
        fs::write(path, format!("NAME window_{}\nENDATA\n", self.0))
    }
}

/// Builder that records which entry point was used for each window.
#[derive(Debug, Default)]
pub struct RecordingBuilder {
    pub calls: Vec<BuilderCall>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuilderCall {
    pub kind: &'static str,
    pub window: usize,
    pub initial: InitialConditions,
}

impl ModelBuilder for RecordingBuilder {
    type Model = WindowModel;

    fn build(
        &mut self,
        window: usize,
        initial: &InitialConditions,
        _options: &SolverOptions,
    ) -> Result<WindowModel, BuildError> {
        self.calls.push(BuilderCall {
            kind: "build",
            window,
            initial: initial.clone(),
        });
        Ok(WindowModel(window))
    }

    fn update(
        &mut self,
        window: usize,
        initial: &InitialConditions,
        _options: &SolverOptions,
    ) -> Result<WindowModel, BuildError> {
        self.calls.push(BuilderCall {
            kind: "update",
            window,
            initial: initial.clone(),
        });
        Ok(WindowModel(window))
    }
}

/// One scripted solver verdict.
#[derive(Debug, Clone)]
pub enum Step {
    Solved(NamedSolution),
    Infeasible { runtime_secs: f64, certificate: String },
}

/// Engine that replays a fixed script of verdicts and counts its solves.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    script: VecDeque<Step>,
    pub solved_windows: Vec<usize>,
}

impl ScriptedEngine {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            script: script.into(),
            solved_windows: Vec::new(),
        }
    }
}

impl SolverEngine<WindowModel> for ScriptedEngine {
    type Solution = NamedSolution;

    fn solve(
        &mut self,
        model: &WindowModel,
        _options: &SolverOptions,
    ) -> Result<SolveOutcome<NamedSolution>, EngineError> {
        self.solved_windows.push(model.0);
        match self.script.pop_front() {
            Some(Step::Solved(s)) => Ok(SolveOutcome::Solved(s)),
            Some(Step::Infeasible {
                runtime_secs,
                certificate,
            }) => Ok(SolveOutcome::Infeasible(Infeasibility {
                runtime_secs,
                certificate,
            })),
            None => Err(EngineError::NoSolution {
                status: "script exhausted".to_string(),
            }),
        }
    }
}

pub fn scripted_simulator(
    mode: ExecutionMode,
    script: Vec<Step>,
) -> Simulator<RecordingBuilder, ScriptedEngine> {
    Simulator::new(
        SimConfig::new(T, mode, SolverOptions::default()),
        RecordingBuilder::default(),
        ScriptedEngine::new(script),
        extractor(),
    )
}
