//! Rolling-horizon simulator entry point: CLI wiring and config-driven run construction.

use std::io;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use horizon_sim::cli::CliOptions;
use horizon_sim::config::{EngineKind, RunConfig};
use horizon_sim::error::ExportError;
use horizon_sim::io::export::{OutputNaming, export_record};
use horizon_sim::record::{Extractor, InitialConditions};
use horizon_sim::sim::{RunOutcome, Simulator};
use horizon_sim::solver::SolverEngine;
use horizon_sim::solver::external::ExternalSolver;
use horizon_sim::solver::instance::{InstanceFile, InstanceLibrary};
use horizon_sim::solver::replay::ReplayEngine;

/// Exit code of a run halted by an infeasible window.
const EXIT_INFEASIBLE: u8 = 2;

fn print_summary<M>(outcome: &RunOutcome<M>) {
    let runtimes = outcome.record().runtimes();
    println!(
        "windows solved: {}/{}",
        outcome.windows_solved(),
        outcome.windows_expected()
    );
    println!(
        "solve time: total {:.2} s, mean {:.2} s, max {:.2} s over {} solves",
        runtimes.total_secs(),
        runtimes.mean_secs(),
        runtimes.max_secs(),
        runtimes.len()
    );
    if let Some(window) = outcome.infeasible_window() {
        println!("halted: window {} is infeasible", window.window);
    }
    if let Some(e) = outcome.error() {
        println!("failed: {e}");
    }
}

/// Runs the horizon with the given engine, then writes tables and diagnostics.
///
/// Partial tables are written for halted and failed runs too.
fn execute<S>(cfg: &RunConfig, solver: S) -> Result<ExitCode, ExportError>
where
    S: SolverEngine<InstanceFile>,
{
    let builder = InstanceLibrary::new(cfg.instance_dir(), cfg.simulation.model_name.clone());
    let extractor = Extractor::new(cfg.system_params(), cfg.extraction);
    let mut sim = Simulator::new(cfg.sim_config(), builder, solver, extractor);
    if cfg.solver.write_models {
        sim = sim.with_model_export(cfg.model_export_dir());
    }

    let outcome = sim.run(
        cfg.simulation.steps,
        InitialConditions::default(),
        cfg.simulation.simulated_day,
    );

    let out = &cfg.output.dir;
    if let Some(bundle) = outcome.dump_diagnostics(out, &cfg.simulation.model_name)? {
        eprintln!("Infeasibility certificate written to {}", bundle.certificate.display());
    }

    let naming = OutputNaming::new(
        Local::now(),
        cfg.simulation.model_name.clone(),
        cfg.simulation.mode,
        cfg.simulation.simulated_day,
        outcome.windows_solved(),
        cfg.simulation.window_hours,
    );
    let tables = export_record(outcome.record(), out, &naming)?;
    eprintln!("{} tables written to {}", tables.len(), out.display());

    print_summary(&outcome);

    Ok(match outcome {
        RunOutcome::Completed { .. } => ExitCode::SUCCESS,
        RunOutcome::InfeasibleHalt { .. } => ExitCode::from(EXIT_INFEASIBLE),
        RunOutcome::Failed { .. } => ExitCode::FAILURE,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = CliOptions::parse();

    let mut cfg = match RunConfig::from_toml_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut cfg);

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        return ExitCode::FAILURE;
    }

    let result = match cfg.solver.engine {
        EngineKind::Replay => execute(&cfg, ReplayEngine::new()),
        EngineKind::External => execute(
            &cfg,
            ExternalSolver::new(cfg.solver.command.clone(), cfg.solver.args.clone()),
        ),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "writing results failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
