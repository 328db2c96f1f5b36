// posefuse_core/src/utils/mod.rs

//! Small numeric helpers shared by every estimator in the crate.

pub mod angles;
pub mod linalg;
pub mod stats;
