#![allow(dead_code)]

use posefuse_sim::prelude::*;

/// A short scenario with noise-free sensors.
pub fn quiet_scenario(motion: MotionProfile, seconds: f64) -> ScenarioConfig {
    let mut scenario = ScenarioConfig::default();
    scenario.simulation.name = "test".to_string();
    scenario.simulation.duration_seconds = seconds;
    scenario.imu.accel_noise_std = [0.0; 3];
    scenario.imu.gyro_noise_std = [0.0; 3];
    scenario.camera.enabled = false;
    scenario.motion = motion;
    scenario
}

pub fn forward(accel: f64, yaw_rate: f64) -> MotionProfile {
    MotionProfile::Constant { accel, yaw_rate }
}

pub fn shipped_scenarios_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets/scenarios")
}
