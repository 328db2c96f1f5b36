// posefuse_core/src/prelude.rs

// --- Configuration and errors ---
pub use crate::config::{
    EkfSlamConfig, FeatureTrackerConfig, FusionConfig, PoseFusionConfig, SimulatedLandmarkConfig,
    VisualOdometryConfig,
};
pub use crate::error::{ConfigError, EstimationError, FrameError, LinalgError};

// --- Core data structures ---
pub use crate::mapping::{Landmark, MapPoint, MapPointOrigin};
pub use crate::messages::{
    FeatureDetectionResult, FusionResult, ImuSample, RangeBearing, SlamSnapshot, SourceFlags,
    TrackingGrade, VisualSnapshot,
};
pub use crate::types::{LandmarkId, Pose2D};

// --- Estimators ---
pub use crate::estimation::{DeadReckoning, EkfSlamEngine, PoseEstimator};
pub use crate::fusion::FusionEngine;
pub use crate::vision::{
    FeaturePoint, FeatureTracker, TrackingState, VisualOdometryEstimator, VisualOdometryHandle,
};

// --- Model contracts ---
pub use crate::models::dynamics::{MotionModel, OdometryDelta};
pub use crate::models::perception::{LandmarkSensor, SimulatedLandmarkSensor};
