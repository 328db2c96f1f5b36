// posefuse_sim/src/simulation/config/structs.rs

use posefuse_core::prelude::PoseFusionConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

// =========================================================================
// == Top-Level Scenario ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a scenario TOML file. Every section is
/// optional; missing sections fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub simulation: Simulation,
    pub imu: ImuConfig,
    pub camera: CameraConfig,
    pub motion: MotionProfile,
    /// Estimator tunables, passed untouched to `posefuse_core`.
    pub core: PoseFusionConfig,
}

impl ScenarioConfig {
    /// Number of IMU ticks in the run.
    pub fn total_steps(&self) -> usize {
        (self.simulation.duration_seconds * self.imu.rate_hz).round() as usize
    }

    /// IMU ticks between two camera frames.
    pub fn camera_stride(&self) -> usize {
        ((self.imu.rate_hz / self.camera.rate_hz).round() as usize).max(1)
    }

    /// IMU ticks between two state-error reports.
    pub fn report_stride(&self) -> usize {
        ((self.simulation.report_interval_seconds * self.imu.rate_hz).round() as usize).max(1)
    }

    /// Replaces the run seed and the seed of the simulated landmark sensor.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.simulation.seed = seed;
        self.core.fusion.landmark_sensor.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        positive("simulation.duration_seconds", self.simulation.duration_seconds)?;
        positive(
            "simulation.report_interval_seconds",
            self.simulation.report_interval_seconds,
        )?;
        positive("imu.rate_hz", self.imu.rate_hz)?;
        positive("imu.gravity", self.imu.gravity)?;
        for std in self.imu.accel_noise_std.iter().chain(&self.imu.gyro_noise_std) {
            if !(std.is_finite() && *std >= 0.0) {
                return Err(SimError::invalid(
                    "imu.noise_std",
                    format!("must be finite and >= 0, got {}", std),
                ));
            }
        }
        positive("camera.rate_hz", self.camera.rate_hz)?;
        if self.camera.rate_hz > self.imu.rate_hz {
            return Err(SimError::invalid(
                "camera.rate_hz",
                "must not exceed imu.rate_hz",
            ));
        }
        if self.camera.width < CameraConfig::MIN_SIDE || self.camera.height < CameraConfig::MIN_SIDE {
            return Err(SimError::invalid(
                "camera.width",
                format!(
                    "frame must be at least {0}x{0}, got {1}x{2}",
                    CameraConfig::MIN_SIDE,
                    self.camera.width,
                    self.camera.height
                ),
            ));
        }
        positive("camera.pixels_per_meter", self.camera.pixels_per_meter)?;
        if self.camera.checker_size == 0 {
            return Err(SimError::invalid("camera.checker_size", "must be > 0"));
        }
        self.motion.validate()?;
        self.core.validate()?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(field, format!("must be > 0, got {}", value)))
    }
}

// =========================================================================
// == Scenario Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Simulation {
    /// Label used in logs; the file stem when left empty.
    pub name: String,
    /// Seed for the synthetic sensor noise.
    pub seed: u64,
    /// Duration of the run in simulated seconds.
    pub duration_seconds: f64,
    /// How often the state error against ground truth is logged.
    pub report_interval_seconds: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            name: String::new(),
            seed: 0,
            duration_seconds: 10.0,
            report_interval_seconds: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImuConfig {
    pub rate_hz: f64,
    /// Magnitude of the gravity reaction reported on the z axis, m/s².
    pub gravity: f64,
    pub accel_noise_std: [f64; 3],
    pub gyro_noise_std: [f64; 3],
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            rate_hz: 50.0,
            gravity: 9.81,
            accel_noise_std: [0.02, 0.02, 0.02],
            gyro_noise_std: [0.002, 0.002, 0.002],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// When false no frames are rendered and the worker thread is not started.
    pub enabled: bool,
    pub rate_hz: f64,
    pub width: usize,
    pub height: usize,
    /// Scale of the textured floor seen by the camera.
    pub pixels_per_meter: f64,
    /// Side of one texture cell, pixels.
    pub checker_size: usize,
}

impl CameraConfig {
    pub const MIN_SIDE: usize = 16;
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate_hz: 10.0,
            width: 160,
            height: 120,
            pixels_per_meter: 40.0,
            checker_size: 20,
        }
    }
}

/// The commanded body motion that the synthetic IMU reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
#[serde(rename_all = "PascalCase")]
pub enum MotionProfile {
    /// Gravity only.
    #[default]
    Stationary,
    /// Fixed forward acceleration magnitude and yaw rate.
    Constant { accel: f64, yaw_rate: f64 },
    /// Fixed forward acceleration with a sinusoidal yaw rate.
    Weave {
        accel: f64,
        yaw_amplitude: f64,
        period_seconds: f64,
    },
}

impl MotionProfile {
    /// `(planar acceleration magnitude, yaw rate)` commanded at time `t`.
    pub fn command(&self, t: f64) -> (f64, f64) {
        match *self {
            MotionProfile::Stationary => (0.0, 0.0),
            MotionProfile::Constant { accel, yaw_rate } => (accel, yaw_rate),
            MotionProfile::Weave {
                accel,
                yaw_amplitude,
                period_seconds,
            } => {
                let phase = std::f64::consts::TAU * t / period_seconds;
                (accel, yaw_amplitude * phase.sin())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            MotionProfile::Stationary => Ok(()),
            MotionProfile::Constant { accel, yaw_rate } => {
                if accel.is_finite() && yaw_rate.is_finite() {
                    Ok(())
                } else {
                    Err(SimError::invalid("motion", "accel and yaw_rate must be finite"))
                }
            }
            MotionProfile::Weave {
                accel,
                yaw_amplitude,
                period_seconds,
            } => {
                positive("motion.period_seconds", period_seconds)?;
                if accel.is_finite() && yaw_amplitude.is_finite() {
                    Ok(())
                } else {
                    Err(SimError::invalid(
                        "motion",
                        "accel and yaw_amplitude must be finite",
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ScenarioConfig::default().validate().is_ok());
    }

    #[test]
    fn test_strides() {
        let scenario = ScenarioConfig::default();
        assert_eq!(scenario.total_steps(), 500);
        assert_eq!(scenario.camera_stride(), 5);
        assert_eq!(scenario.report_stride(), 50);
    }

    #[test]
    fn test_camera_faster_than_imu_is_rejected() {
        let mut scenario = ScenarioConfig::default();
        scenario.camera.rate_hz = 100.0;
        match scenario.validate() {
            Err(SimError::InvalidScenario { field, .. }) => assert_eq!(field, "camera.rate_hz"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_core_errors_surface() {
        let mut scenario = ScenarioConfig::default();
        scenario.core.slam.range_noise = -1.0;
        assert!(matches!(scenario.validate(), Err(SimError::Core(_))));
    }

    #[test]
    fn test_seed_reaches_landmark_sensor() {
        let scenario = ScenarioConfig::default().with_seed(42);
        assert_eq!(scenario.simulation.seed, 42);
        assert_eq!(scenario.core.fusion.landmark_sensor.seed, 42);
    }

    #[test]
    fn test_weave_yaw_rate_is_periodic() {
        let weave = MotionProfile::Weave {
            accel: 1.0,
            yaw_amplitude: 0.5,
            period_seconds: 4.0,
        };
        let (a, w0) = weave.command(0.0);
        assert_eq!(a, 1.0);
        assert_abs_diff_eq!(w0, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(weave.command(1.0).1, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(weave.command(5.0).1, 0.5, epsilon = 1e-9);
    }
}
