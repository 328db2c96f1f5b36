// posefuse_core/src/vision/mod.rs

//! Sparse optical flow from 8-bit luminance frames.
//!
//! Two consumers share the primitives here: the `FeatureTracker`, which
//! turns flow into a metric camera displacement, and the cheaper
//! `VisualOdometryEstimator`, which integrates flow straight into a pose.

use serde::{Deserialize, Serialize};

pub mod corners;
pub mod feature_tracker;
pub mod image;
pub mod matching;
pub mod visual_odometry;

pub use feature_tracker::{FeatureTracker, MotionEstimate};
pub use image::LumaFrame;
pub use visual_odometry::{TrackingState, VisualOdometryEstimator, VisualOdometryHandle};

/// A scored corner candidate in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeaturePoint {
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

impl FeaturePoint {
    pub fn new(x: f32, y: f32, score: f32) -> Self {
        Self { x, y, score }
    }

    pub fn distance_squared(&self, other: &FeaturePoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// A feature in the current frame paired with its nearest predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatch {
    pub current: FeaturePoint,
    pub previous: FeaturePoint,
}

impl FeatureMatch {
    /// Pixel displacement from the previous frame to the current one.
    pub fn flow(&self) -> (f64, f64) {
        (
            (self.current.x - self.previous.x) as f64,
            (self.current.y - self.previous.y) as f64,
        )
    }

    pub fn flow_magnitude(&self) -> f64 {
        let (dx, dy) = self.flow();
        dx.hypot(dy)
    }
}
