// posefuse_core/src/models/perception/landmark_sensor.rs

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};

use crate::config::SimulatedLandmarkConfig;
use crate::error::ConfigError;
use crate::messages::RangeBearing;
use crate::models::perception::LandmarkSensor;
use crate::types::{LandmarkId, Pose2D};
use crate::utils::angles::normalize_angle;

/// Observes a fixed set of landmarks with uniform range and bearing jitter.
///
/// Visibility is decided on the true range, so a landmark near the edge is
/// either always or never reported regardless of noise.
#[derive(Debug, Clone)]
pub struct SimulatedLandmarkSensor {
    config: SimulatedLandmarkConfig,
    rng: ChaCha8Rng,
    range_jitter: Uniform<f64>,
    bearing_jitter: Uniform<f64>,
}

impl SimulatedLandmarkSensor {
    pub fn new(config: SimulatedLandmarkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            range_jitter: Uniform::new_inclusive(-config.range_jitter, config.range_jitter),
            bearing_jitter: Uniform::new_inclusive(-config.bearing_jitter, config.bearing_jitter),
            config,
        })
    }

    pub fn landmarks(&self) -> &[[f64; 2]] {
        &self.config.landmarks
    }
}

impl LandmarkSensor for SimulatedLandmarkSensor {
    fn observe(&mut self, pose: &Pose2D) -> Vec<RangeBearing> {
        let mut out = Vec::with_capacity(self.config.landmarks.len());
        for (index, [lx, ly]) in self.config.landmarks.iter().copied().enumerate() {
            let dx = lx - pose.x;
            let dy = ly - pose.y;
            let range = dx.hypot(dy);
            // Draw noise for every landmark so the stream does not depend on visibility.
            let range_noise = self.range_jitter.sample(&mut self.rng);
            let bearing_noise = self.bearing_jitter.sample(&mut self.rng);
            if range >= self.config.max_range {
                continue;
            }
            let bearing = normalize_angle(dy.atan2(dx) - pose.theta);
            out.push(RangeBearing::new(
                range + range_noise,
                normalize_angle(bearing + bearing_noise),
                LandmarkId(index as u64),
            ));
        }
        out
    }

    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
    }

    fn max_range(&self) -> f64 {
        self.config.max_range
    }
}
