use clap::Parser;
use std::path::PathBuf;

/// Posefuse: headless runner for the planar pose fusion stack.
///
/// Drives dead reckoning, EKF-SLAM and visual odometry with synthetic
/// sensors described by a scenario TOML file.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/00_stationary.toml")]
    pub scenario: PathBuf,

    /// Run every scenario found under this directory instead.
    #[arg(long, conflicts_with = "scenario")]
    pub scenario_dir: Option<PathBuf>,

    /// Print the resolved scenario as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub dump_config: bool,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Override the scenario seed.
    #[arg(long)]
    pub seed: Option<u64>,
}
