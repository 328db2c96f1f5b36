// posefuse_core/src/types.rs

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::angles::normalize_angle;

// --- Core Type Aliases ---
pub type State = DVector<f64>;
pub type Covariance = DMatrix<f64>;

// --- Core Identifier ---
/// The opaque, caller-supplied signature that ties a measurement to a landmark.
///
/// The EKF never infers it; whoever produces measurements owns association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LandmarkId(pub u64);

impl fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A planar pose. `theta` is kept in `(-PI, PI]` by every producer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    pub const ORIGIN: Pose2D = Pose2D {
        x: 0.0,
        y: 0.0,
        theta: 0.0,
    };

    /// Builds a pose, wrapping `theta`.
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Euclidean distance between the positions of two poses.
    pub fn distance_to(&self, other: &Pose2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }
}

impl fmt::Display for Pose2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.1}°)",
            self.x,
            self.y,
            self.theta.to_degrees()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_pose_new_wraps_heading() {
        let p = Pose2D::new(1.0, 2.0, 3.0 * PI);
        assert_abs_diff_eq!(p.theta, PI, epsilon = 1e-9);
        assert_eq!(p.x, 1.0);
    }

    #[test]
    fn test_pose_distance() {
        let a = Pose2D::new(0.0, 0.0, 0.0);
        let b = Pose2D::new(3.0, 4.0, 1.0);
        assert_abs_diff_eq!(a.distance_to(&b), 5.0);
    }
}
