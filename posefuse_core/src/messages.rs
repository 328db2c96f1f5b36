// posefuse_core/src/messages.rs

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::mapping::{Landmark, MapPoint};
use crate::types::{LandmarkId, Pose2D};
use crate::vision::{FeatureMatch, FeaturePoint};

// =========================================================================
// == Sensor Inputs ==
// =========================================================================

/// One accelerometer + gyroscope reading, body frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImuSample {
    /// Specific force in m/s², `[ax, ay, az]`.
    pub accel: [f64; 3],
    /// Angular rate in rad/s, `[gx, gy, gz]`.
    pub gyro: [f64; 3],
    /// Time since the previous sample, seconds.
    pub dt: f64,
}

impl ImuSample {
    pub fn new(accel: [f64; 3], gyro: [f64; 3], dt: f64) -> Self {
        Self { accel, gyro, dt }
    }

    /// Magnitude of the planar acceleration.
    pub fn planar_accel(&self) -> f64 {
        self.accel[0].hypot(self.accel[1])
    }

    pub fn yaw_rate(&self) -> f64 {
        self.gyro[2]
    }
}

/// A range-bearing observation of a landmark, relative to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBearing {
    pub range: f64,
    /// Radians, relative to the robot heading.
    pub bearing: f64,
    /// Caller-supplied association key.
    pub id: LandmarkId,
}

impl RangeBearing {
    pub fn new(range: f64, bearing: f64, id: LandmarkId) -> Self {
        Self { range, bearing, id }
    }

    pub fn is_finite(&self) -> bool {
        self.range.is_finite() && self.bearing.is_finite()
    }
}

// =========================================================================
// == Estimator Outputs ==
// =========================================================================

/// State of the EKF-SLAM engine after a predict or update.
#[derive(Debug, Clone, PartialEq)]
pub struct SlamSnapshot {
    pub pose: Pose2D,
    pub landmarks: Vec<Landmark>,
    pub state_dim: usize,
    /// Mean over every covariance entry.
    pub average_covariance: f64,
    /// The 3x3 robot block of the covariance.
    pub pose_covariance: Matrix3<f64>,
    /// Latest dead-reckoning pose handed to the engine, if any.
    pub reference_pose: Option<Pose2D>,
}

/// Tracking health as shown to an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingGrade {
    Good,
    Medium,
    Poor,
}

/// Output of one `FeatureTracker::detect` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureDetectionResult {
    pub features: Vec<FeaturePoint>,
    pub matches: Vec<FeatureMatch>,
    /// Accumulated camera displacement `(x, y)` in world units.
    pub estimated_position: (f64, f64),
    pub processing_time_ms: f64,
}

impl FeatureDetectionResult {
    /// Classifies the frame by the share of features that found a match.
    pub fn tracking_grade(&self) -> TrackingGrade {
        if self.features.is_empty() {
            return TrackingGrade::Poor;
        }
        let ratio = self.matches.len() as f64 / self.features.len() as f64;
        if ratio > 0.5 {
            TrackingGrade::Good
        } else if ratio > 0.2 {
            TrackingGrade::Medium
        } else {
            TrackingGrade::Poor
        }
    }
}

/// What the visual estimator publishes after each frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualSnapshot {
    pub pose: Pose2D,
    pub z: f64,
    pub quality: f64,
    pub is_tracking: bool,
    pub frames_processed: u64,
    pub feature_count: usize,
    pub match_count: usize,
    pub map_points: Vec<MapPoint>,
}

/// Which sources the fusion engine currently blends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFlags {
    pub dr: bool,
    pub slam: bool,
    pub visual: bool,
}

impl SourceFlags {
    pub fn any(&self) -> bool {
        self.dr || self.slam || self.visual
    }
}

/// Immutable snapshot produced by every `FusionEngine::update_imu`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionResult {
    pub dr_pose: Pose2D,
    pub slam_pose: Pose2D,
    pub visual_pose: Pose2D,
    pub visual_z: f64,
    pub fused_pose: Pose2D,
    pub landmarks: Vec<Landmark>,
    pub visual_map_points: Vec<MapPoint>,
    pub flags: SourceFlags,
    /// Accumulated IMU time, seconds.
    pub timestamp: f64,
}
