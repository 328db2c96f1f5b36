// posefuse_sim/src/simulation/sensors/imu.rs

use posefuse_core::prelude::ImuSample;
use rand_distr::{Distribution, Normal};

use crate::error::{Result, SimError};
use crate::simulation::config::{ImuConfig, MotionProfile};
use crate::simulation::core::prng::SimulationRng;

// =========================================================================
// == Synthetic IMU ==
// =========================================================================

/// Turns the commanded motion into body-frame IMU samples.
///
/// The ideal sample carries the forward acceleration on x, the gravity
/// reaction on z and the yaw rate on gyro z. The measured sample adds
/// independent zero-mean Gaussian noise to every axis.
#[derive(Debug, Clone)]
pub struct SyntheticImu {
    dt: f64,
    gravity: f64,
    accel_noise: [Normal<f64>; 3], // X, Y, Z
    gyro_noise: [Normal<f64>; 3],  // X, Y, Z
    rng: SimulationRng,
}

impl SyntheticImu {
    pub fn new(config: &ImuConfig, rng: SimulationRng) -> Result<Self> {
        Ok(Self {
            dt: 1.0 / config.rate_hz,
            gravity: config.gravity,
            accel_noise: noise_triplet("imu.accel_noise_std", &config.accel_noise_std)?,
            gyro_noise: noise_triplet("imu.gyro_noise_std", &config.gyro_noise_std)?,
            rng,
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// The noise-free sample for the command at time `t`.
    pub fn ideal(&self, motion: &MotionProfile, t: f64) -> ImuSample {
        let (accel, yaw_rate) = motion.command(t);
        ImuSample::new([accel, 0.0, self.gravity], [0.0, 0.0, yaw_rate], self.dt)
    }

    /// `ideal` corrupted by one draw of sensor noise.
    pub fn measure(&mut self, ideal: &ImuSample) -> ImuSample {
        let mut noisy = *ideal;
        for axis in 0..3 {
            noisy.accel[axis] += self.accel_noise[axis].sample(&mut self.rng.0);
            noisy.gyro[axis] += self.gyro_noise[axis].sample(&mut self.rng.0);
        }
        noisy
    }
}

fn noise_triplet(field: &'static str, std: &[f64; 3]) -> Result<[Normal<f64>; 3]> {
    let make = |s: f64| Normal::new(0.0, s).map_err(|e| SimError::invalid(field, e.to_string()));
    Ok([make(std[0])?, make(std[1])?, make(std[2])?])
}
