// posefuse_sim/src/simulation/core/ground_truth.rs

use posefuse_core::prelude::{DeadReckoning, ImuSample, PoseEstimator, Pose2D};

/// The true planar state of the simulated robot.
///
/// Truth is defined as the pose the IMU kinematics produce from noise-free
/// samples, so the error reports isolate sensor noise and estimator drift.
#[derive(Debug, Clone)]
pub struct GroundTruthState {
    kinematics: DeadReckoning,
    time: f64,
}

impl GroundTruthState {
    pub fn new(speed_gain: f64) -> Self {
        Self {
            kinematics: DeadReckoning::new(speed_gain),
            time: 0.0,
        }
    }

    /// Advances the truth by one noise-free sample.
    pub fn advance(&mut self, ideal: &ImuSample) -> Pose2D {
        self.time += ideal.dt;
        self.kinematics.integrate(ideal)
    }

    pub fn pose(&self) -> Pose2D {
        self.kinematics.pose()
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_straight_line() {
        let mut truth = GroundTruthState::new(0.5);
        for _ in 0..10 {
            truth.advance(&ImuSample::new([1.0, 0.0, 9.81], [0.0; 3], 0.1));
        }
        assert_abs_diff_eq!(truth.pose().x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(truth.pose().y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(truth.time(), 1.0, epsilon = 1e-12);
    }
}
