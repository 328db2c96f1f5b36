// posefuse_core/src/estimation/mod.rs

use crate::types::Pose2D;

/// The contract shared by every pose source the fusion engine blends.
pub trait PoseEstimator: Send {
    /// Current best estimate of the robot pose.
    fn pose(&self) -> Pose2D;

    /// Returns the estimator to its initial state.
    fn reset(&mut self);
}

pub mod dead_reckoning;
pub mod ekf_slam;

pub use dead_reckoning::DeadReckoning;
pub use ekf_slam::EkfSlamEngine;
