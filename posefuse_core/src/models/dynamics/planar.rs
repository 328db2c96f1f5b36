// posefuse_core/src/models/dynamics/planar.rs

use crate::models::dynamics::{MotionModel, OdometryDelta};
use crate::types::Pose2D;
use nalgebra::Matrix3;

/// Rigid planar odometry: rotate the body-frame increment into the world
/// frame by the current heading, then add it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarOdometryModel {
    /// Scales `|dx|, |dy|, |dtheta|` into the diagonal of `Q`.
    pub noise_scale: f64,
}

impl Default for PlanarOdometryModel {
    fn default() -> Self {
        Self { noise_scale: 0.01 }
    }
}

impl MotionModel for PlanarOdometryModel {
    fn propagate(&self, pose: &Pose2D, delta: &OdometryDelta) -> Pose2D {
        let (sin_t, cos_t) = pose.theta.sin_cos();
        Pose2D::new(
            pose.x + delta.dx * cos_t - delta.dy * sin_t,
            pose.y + delta.dx * sin_t + delta.dy * cos_t,
            pose.theta + delta.dtheta,
        )
    }

    fn calculate_jacobian(&self, pose: &Pose2D, delta: &OdometryDelta) -> Matrix3<f64> {
        let (sin_t, cos_t) = pose.theta.sin_cos();
        #[rustfmt::skip]
        let f = Matrix3::new(
            1.0, 0.0, -delta.dx * sin_t - delta.dy * cos_t,
            0.0, 1.0,  delta.dx * cos_t - delta.dy * sin_t,
            0.0, 0.0,  1.0,
        );
        f
    }

    fn process_noise(&self, delta: &OdometryDelta) -> Matrix3<f64> {
        Matrix3::from_diagonal(&nalgebra::Vector3::new(
            self.noise_scale * delta.dx.abs(),
            self.noise_scale * delta.dy.abs(),
            self.noise_scale * delta.dtheta.abs(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_forward_motion_follows_heading() {
        let model = PlanarOdometryModel::default();
        let pose = Pose2D::new(1.0, 1.0, FRAC_PI_2);
        let next = model.propagate(&pose, &OdometryDelta::new(2.0, 0.0, 0.0));
        assert_abs_diff_eq!(next.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(next.y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_heading_is_wrapped() {
        let model = PlanarOdometryModel::default();
        let pose = Pose2D::new(0.0, 0.0, PI - 0.1);
        let next = model.propagate(&pose, &OdometryDelta::new(0.0, 0.0, 0.3));
        assert_abs_diff_eq!(next.theta, -PI + 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_jacobian_matches_finite_difference() {
        let model = PlanarOdometryModel::default();
        let pose = Pose2D::new(0.5, -0.3, 0.7);
        let delta = OdometryDelta::new(0.4, 0.1, 0.05);
        let f = model.calculate_jacobian(&pose, &delta);

        let h = 1e-6;
        let plus = model.propagate(&Pose2D::new(pose.x, pose.y, pose.theta + h), &delta);
        let minus = model.propagate(&Pose2D::new(pose.x, pose.y, pose.theta - h), &delta);
        assert_abs_diff_eq!(f[(0, 2)], (plus.x - minus.x) / (2.0 * h), epsilon = 1e-6);
        assert_abs_diff_eq!(f[(1, 2)], (plus.y - minus.y) / (2.0 * h), epsilon = 1e-6);
        assert_eq!(f[(0, 0)], 1.0);
        assert_eq!(f[(2, 2)], 1.0);
    }

    #[test]
    fn test_process_noise_scales_with_magnitude() {
        let model = PlanarOdometryModel::default();
        let q = model.process_noise(&OdometryDelta::new(-2.0, 0.0, 0.5));
        assert_abs_diff_eq!(q[(0, 0)], 0.02);
        assert_abs_diff_eq!(q[(1, 1)], 0.0);
        assert_abs_diff_eq!(q[(2, 2)], 0.005);
        assert_eq!(q[(0, 1)], 0.0);
    }
}
