//! Experiment driver for the memory hierarchy simulator.
//!
//! Loads a JSON scenario (configuration, cycle budget, per-core traces),
//! runs the simulation, and prints the statistics report. Event-level
//! tracing goes to stderr at the verbosity chosen with `--log`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;

use memsim_core::{SimConfig, Simulator, Trace};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "memsim", about = "Cycle-accurate memory hierarchy simulator")]
struct Args {
    /// Path to the JSON scenario file.
    scenario: PathBuf,

    /// Override the scenario's cycle budget.
    #[arg(long)]
    cycles: Option<u64>,

    /// Log filter (e.g. "warn", "memsim_core=trace").
    #[arg(long, default_value = "warn")]
    log: String,
}

/// A self-contained experiment: configuration, budget, and traces.
#[derive(Debug, Deserialize)]
struct Scenario {
    /// Simulator configuration; defaults apply where omitted.
    #[serde(default)]
    config: SimConfig,

    /// Cycles to simulate.
    cycles: u64,

    /// One trace per core, indexed by core id; missing cores stay idle.
    #[serde(default)]
    traces: Vec<Trace>,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&args.scenario)?;
    let scenario: Scenario = serde_json::from_str(&text)?;

    let mut sim = Simulator::new(&scenario.config)?;
    for (core_id, trace) in scenario.traces.into_iter().enumerate() {
        sim.load_trace(core_id, trace)?;
    }

    sim.simulate(args.cycles.unwrap_or(scenario.cycles));
    sim.report().print();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&args.log)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&args) {
        eprintln!("memsim: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
