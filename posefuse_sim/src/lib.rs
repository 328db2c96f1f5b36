// posefuse_sim/src/lib.rs

// This prelude is for convenience for other files WITHIN the posefuse_sim crate
// and for the binary.
pub mod prelude;

pub mod cli;
pub mod error;
pub mod simulation;

use std::path::PathBuf;

use tracing::info;

use crate::cli::Cli;
use crate::error::Result;
use crate::simulation::config::{discover_scenarios, load_scenario, to_toml, ScenarioConfig};
use crate::simulation::runner::{run_scenario, RunSummary};

/// Resolves the scenarios named on the command line, applying `--seed`.
pub fn resolve_scenarios(cli: &Cli) -> Result<Vec<ScenarioConfig>> {
    let paths: Vec<PathBuf> = match &cli.scenario_dir {
        Some(dir) => discover_scenarios(dir)?,
        None => vec![cli.scenario.clone()],
    };

    paths
        .iter()
        .map(|path| {
            let scenario = load_scenario(path)?;
            Ok(match cli.seed {
                Some(seed) => scenario.with_seed(seed),
                None => scenario,
            })
        })
        .collect()
}

/// Runs every resolved scenario in order, or prints them with `--dump-config`.
pub fn run(cli: &Cli) -> Result<Vec<RunSummary>> {
    let scenarios = resolve_scenarios(cli)?;
    if cli.dump_config {
        for scenario in &scenarios {
            println!("# {}\n{}", scenario.simulation.name, to_toml(scenario)?);
        }
        return Ok(Vec::new());
    }

    info!("Running {} scenario(s)", scenarios.len());
    scenarios.iter().map(run_scenario).collect()
}
