// posefuse_sim/src/main.rs

use std::process::ExitCode;

use clap::Parser;
use posefuse_sim::cli::Cli;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --log-level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("posefuse v{}", env!("CARGO_PKG_VERSION"));
    match posefuse_sim::run(&cli) {
        Ok(summaries) => {
            if !summaries.is_empty() {
                info!("Completed {} scenario(s)", summaries.len());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
