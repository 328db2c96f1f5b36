// posefuse_sim/src/simulation/core/mod.rs

pub mod frame_channel;
pub mod ground_truth;
pub mod prng;
