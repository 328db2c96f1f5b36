// posefuse_core/src/estimation/dead_reckoning.rs

use crate::estimation::PoseEstimator;
use crate::messages::ImuSample;
use crate::models::dynamics::{MotionModel, OdometryDelta, PlanarOdometryModel};
use crate::types::Pose2D;

/// Integrates IMU samples into a planar pose with no correction.
///
/// The forward step is a heuristic: planar acceleration magnitude times
/// `dt` times a gain, not a true double integration.
#[derive(Debug, Clone)]
pub struct DeadReckoning {
    pose: Pose2D,
    motion: PlanarOdometryModel,
    speed_gain: f64,
}

impl DeadReckoning {
    pub fn new(speed_gain: f64) -> Self {
        Self {
            pose: Pose2D::ORIGIN,
            motion: PlanarOdometryModel::default(),
            speed_gain,
        }
    }

    /// The body-frame increment implied by one IMU sample.
    pub fn odometry_from_imu(sample: &ImuSample, speed_gain: f64) -> OdometryDelta {
        OdometryDelta::new(
            sample.planar_accel() * sample.dt * speed_gain,
            0.0,
            sample.yaw_rate() * sample.dt,
        )
    }

    /// Applies a precomputed increment and returns the new pose.
    pub fn apply(&mut self, delta: &OdometryDelta) -> Pose2D {
        self.pose = self.motion.propagate(&self.pose, delta);
        self.pose
    }

    pub fn integrate(&mut self, sample: &ImuSample) -> Pose2D {
        let delta = Self::odometry_from_imu(sample, self.speed_gain);
        self.apply(&delta)
    }
}

impl Default for DeadReckoning {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl PoseEstimator for DeadReckoning {
    fn pose(&self) -> Pose2D {
        self.pose
    }

    fn reset(&mut self) {
        self.pose = Pose2D::ORIGIN;
    }
}
