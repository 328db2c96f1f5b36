// posefuse_sim/src/simulation/config/mod.rs

//! Loading, layering and validating scenario files.
//!
//! A scenario is resolved in three layers: built-in defaults, the TOML file,
//! then `POSEFUSE_` environment overrides (`__` separates nested keys, e.g.
//! `POSEFUSE_CORE__FUSION__SLAM_ENABLED=true`).

pub mod structs;

use std::io;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{Result, SimError};
pub use structs::{CameraConfig, ImuConfig, MotionProfile, ScenarioConfig, Simulation};

pub const ENV_PREFIX: &str = "POSEFUSE_";

/// Builds the layered figment for `path` without extracting it.
pub fn scenario_figment(path: &Path) -> Figment {
    Figment::from(Serialized::defaults(ScenarioConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Loads, names and validates one scenario file.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig> {
    if !path.is_file() {
        return Err(SimError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "scenario file not found"),
        });
    }

    info!("Loading scenario from: {:?}", path);
    let mut scenario: ScenarioConfig = scenario_figment(path).extract()?;
    if scenario.simulation.name.is_empty() {
        scenario.simulation.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scenario".to_string());
    }
    scenario.validate()?;
    Ok(scenario)
}

/// Every `*.toml` below `dir`, sorted by path.
pub fn discover_scenarios(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SimError::Io {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "scenario directory not found"),
        });
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Skipping unreadable entry under {:?}: {}", dir, e);
                None
            }
        })
        .filter(|e| {
            !e.file_type().is_dir() && e.path().extension().map_or(false, |ext| ext == "toml")
        })
        .map(|e| e.into_path())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(SimError::NoScenarios(dir.to_path_buf()));
    }
    Ok(paths)
}

/// Renders a resolved scenario back to TOML.
pub fn to_toml(scenario: &ScenarioConfig) -> Result<String> {
    Ok(toml::to_string_pretty(scenario)?)
}
