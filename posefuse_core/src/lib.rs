// posefuse_core/src/lib.rs

pub mod config;
pub mod error;
pub mod estimation;
pub mod fusion;
pub mod mapping;
pub mod messages;
pub mod models;
pub mod prelude;
pub mod types;
pub mod utils;
pub mod vision;
