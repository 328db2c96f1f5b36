// posefuse_core/src/models/dynamics/mod.rs

use crate::types::Pose2D;
use nalgebra::Matrix3;
use std::fmt::Debug;

/// An odometry increment expressed in the robot frame at the start of the step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OdometryDelta {
    /// Forward displacement.
    pub dx: f64,
    /// Leftward displacement.
    pub dy: f64,
    pub dtheta: f64,
}

impl OdometryDelta {
    pub fn new(dx: f64, dy: f64, dtheta: f64) -> Self {
        Self { dx, dy, dtheta }
    }

    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite() && self.dtheta.is_finite()
    }
}

/// A motion model for the 3-DOF robot pose used by the estimators.
///
/// Unlike a continuous-time model, this one maps a discrete odometry
/// increment straight to the next pose, so no integrator is involved.
pub trait MotionModel: Debug + Send + Sync {
    /// Applies `delta` to `pose`, returning the propagated pose with a
    /// normalized heading.
    fn propagate(&self, pose: &Pose2D, delta: &OdometryDelta) -> Pose2D;

    /// Jacobian `F = ∂f/∂x` of `propagate` with respect to the pose,
    /// evaluated at `pose`.
    fn calculate_jacobian(&self, pose: &Pose2D, delta: &OdometryDelta) -> Matrix3<f64>;

    /// Additive process noise `Q` for this increment.
    fn process_noise(&self, delta: &OdometryDelta) -> Matrix3<f64>;
}

pub mod planar;

pub use planar::PlanarOdometryModel;
