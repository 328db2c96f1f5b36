// posefuse_sim/src/simulation/sensors/mod.rs

pub mod camera;
pub mod imu;

pub use camera::{CameraFrame, SyntheticCamera};
pub use imu::SyntheticImu;
