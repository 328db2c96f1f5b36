// posefuse_core/src/models/measurement/range_bearing.rs

use nalgebra::{DMatrix, Matrix2, Vector2};

use crate::messages::RangeBearing;
use crate::types::Pose2D;
use crate::utils::angles::normalize_angle;

/// The range-bearing sensor model `z = h(x) + v` for a point landmark.
///
/// `h` maps the robot pose and one landmark position to
/// `[range, bearing]`, bearing measured from the robot heading.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBearingModel {
    noise_covariance: Matrix2<f64>,
    /// Expected ranges below this make the Jacobian singular.
    pub min_range: f64,
}

impl RangeBearingModel {
    pub fn new(range_noise: f64, bearing_noise: f64, min_range: f64) -> Self {
        Self {
            noise_covariance: Matrix2::new(range_noise, 0.0, 0.0, bearing_noise),
            min_range,
        }
    }

    /// Returns the measurement noise covariance matrix `R`.
    pub fn get_r(&self) -> &Matrix2<f64> {
        &self.noise_covariance
    }

    /// Predicts `[range, bearing]` of `landmark` from `pose`.
    ///
    /// Returns `None` when the landmark sits on top of the robot, where the
    /// bearing is undefined.
    pub fn predict_measurement(&self, pose: &Pose2D, landmark: (f64, f64)) -> Option<Vector2<f64>> {
        let dx = landmark.0 - pose.x;
        let dy = landmark.1 - pose.y;
        let range = dx.hypot(dy);
        if range < self.min_range {
            return None;
        }
        Some(Vector2::new(range, normalize_angle(dy.atan2(dx) - pose.theta)))
    }

    /// Calculates the 2xN Jacobian `H = ∂h/∂x` over the full SLAM state.
    ///
    /// Only the robot columns and the two columns of landmark `slot` are
    /// non-zero.
    pub fn calculate_jacobian(
        &self,
        pose: &Pose2D,
        landmark: (f64, f64),
        slot: usize,
        state_dim: usize,
    ) -> Option<DMatrix<f64>> {
        let col = 3 + 2 * slot;
        if col + 2 > state_dim {
            return None;
        }
        let dx = landmark.0 - pose.x;
        let dy = landmark.1 - pose.y;
        let q = dx * dx + dy * dy;
        let r = q.sqrt();
        if r < self.min_range {
            return None;
        }

        let mut h = DMatrix::zeros(2, state_dim);
        // d(range)/d(robot), d(range)/d(landmark)
        h[(0, 0)] = -dx / r;
        h[(0, 1)] = -dy / r;
        h[(0, col)] = dx / r;
        h[(0, col + 1)] = dy / r;
        // d(bearing)/d(robot), d(bearing)/d(landmark)
        h[(1, 0)] = dy / q;
        h[(1, 1)] = -dx / q;
        h[(1, 2)] = -1.0;
        h[(1, col)] = -dy / q;
        h[(1, col + 1)] = dx / q;
        Some(h)
    }

    /// Measured minus predicted, with the bearing residual wrapped.
    pub fn innovation(&self, measured: &RangeBearing, predicted: &Vector2<f64>) -> Vector2<f64> {
        Vector2::new(
            measured.range - predicted.x,
            normalize_angle(measured.bearing - predicted.y),
        )
    }

    /// World position of the landmark a measurement points at.
    pub fn inverse_observation(&self, pose: &Pose2D, measurement: &RangeBearing) -> (f64, f64) {
        let angle = pose.theta + measurement.bearing;
        (
            pose.x + measurement.range * angle.cos(),
            pose.y + measurement.range * angle.sin(),
        )
    }
}
