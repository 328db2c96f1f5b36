// posefuse_sim/src/error.rs

use std::path::PathBuf;

use posefuse_core::prelude::ConfigError;
use thiserror::Error;

/// Everything that can stop a scenario run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to load scenario: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid scenario parameter `{field}`: {reason}")]
    InvalidScenario { field: &'static str, reason: String },

    #[error(transparent)]
    Core(#[from] ConfigError),

    #[error("scenario directory {0:?} contains no .toml files")]
    NoScenarios(PathBuf),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize scenario: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{0} thread failed")]
    Thread(&'static str),
}

impl From<figment::Error> for SimError {
    fn from(e: figment::Error) -> Self {
        SimError::Figment(Box::new(e))
    }
}

impl SimError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidScenario {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
