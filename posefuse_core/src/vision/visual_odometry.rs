// posefuse_core/src/vision/visual_odometry.rs

use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::config::VisualOdometryConfig;
use crate::error::FrameError;
use crate::estimation::PoseEstimator;
use crate::mapping::{MapPoint, MapPointOrigin, MapPointStore};
use crate::messages::VisualSnapshot;
use crate::types::Pose2D;
use crate::utils::angles::normalize_angle;
use crate::vision::corners::detect_sparse;
use crate::vision::image::LumaFrame;
use crate::vision::matching::match_nearest;
use crate::vision::FeaturePoint;

/// Operator-facing tracking status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackingState {
    Lost,
    Tracking { quality: f64 },
}

impl fmt::Display for TrackingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingState::Lost => write!(f, "Lost"),
            TrackingState::Tracking { quality } => {
                write!(f, "Tracking ({}%)", (quality * 100.0).round() as i64)
            }
        }
    }
}

impl TrackingState {
    fn from_flags(is_tracking: bool, quality: f64) -> Self {
        if is_tracking {
            TrackingState::Tracking { quality }
        } else {
            TrackingState::Lost
        }
    }
}

/// Banded tracking quality from the share of features that were matched.
pub fn tracking_quality(feature_count: usize, match_count: usize) -> f64 {
    if feature_count == 0 {
        return 0.0;
    }
    let ratio = match_count as f64 / feature_count as f64;
    if ratio >= 0.7 {
        0.9
    } else if ratio >= 0.4 {
        0.6
    } else if ratio >= 0.2 {
        0.3
    } else {
        0.1
    }
}

/// Integrates raw mean pixel flow into a planar pose plus a yaw heuristic.
///
/// Cruder than `FeatureTracker`: no outlier rejection,
/// no depth, no smoothing. Its height is a cosmetic function of frame time.
#[derive(Debug, Clone)]
pub struct VisualOdometryEstimator {
    config: VisualOdometryConfig,
    pose: Pose2D,
    z: f64,
    quality: f64,
    is_tracking: bool,
    frames_processed: u64,
    previous: Vec<FeaturePoint>,
    feature_count: usize,
    match_count: usize,
    map: MapPointStore,
}

impl VisualOdometryEstimator {
    pub fn new(config: VisualOdometryConfig) -> Self {
        let map = MapPointStore::new(config.map_point_min_spacing, config.map_point_capacity);
        Self {
            config,
            pose: Pose2D::ORIGIN,
            z: 0.0,
            quality: 0.0,
            is_tracking: false,
            frames_processed: 0,
            previous: Vec::new(),
            feature_count: 0,
            match_count: 0,
            map,
        }
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Points inserted while tracking; never contains display filler.
    pub fn tracked_map_points(&self) -> &[MapPoint] {
        self.map.points()
    }

    pub fn tracking_state(&self) -> TrackingState {
        TrackingState::from_flags(self.is_tracking, self.quality)
    }

    /// Processes one frame taken at `timestamp` seconds.
    pub fn process_frame(
        &mut self,
        luma: &[u8],
        width: usize,
        height: usize,
        timestamp: f64,
    ) -> Result<VisualSnapshot, FrameError> {
        let frame = LumaFrame::new(luma, width, height)?;
        let c = &self.config;
        self.frames_processed += 1;

        let features = detect_sparse(&frame, c.grid_pitch, c.corner_threshold);
        let matches = if self.previous.is_empty() {
            Vec::new()
        } else {
            match_nearest(
                &features,
                &self.previous,
                c.max_match_candidates,
                c.match_radius as f32,
            )
        };

        if !matches.is_empty() && matches.len() >= c.min_matches {
            let n = matches.len() as f64;
            let (sum_x, sum_y) = matches.iter().fold((0.0, 0.0), |(sx, sy), m| {
                let (dx, dy) = m.flow();
                (sx + dx, sy + dy)
            });
            let x = self.pose.x + sum_x / n * c.flow_scale;
            let y = self.pose.y + sum_y / n * c.flow_scale;

            let mut theta = self.pose.theta;
            if features.len() > c.yaw_min_features {
                let (cx, cy) = frame.center();
                let moment: f64 = features
                    .iter()
                    .take(c.yaw_sample_size)
                    .map(|f| ((f.x - cx) * (f.y - cy)) as f64)
                    .sum();
                theta = normalize_angle(theta + moment * c.yaw_scale);
            }
            self.pose = Pose2D { x, y, theta };
            self.z = c.z_amplitude * (timestamp / c.z_period_s).sin();
        }

        self.quality = tracking_quality(features.len(), matches.len());
        self.is_tracking = self.quality > c.tracking_threshold;

        if self.is_tracking
            && c.map_point_interval > 0
            && self.frames_processed % c.map_point_interval == 0
            && matches.len() > c.map_point_min_matches
            && self.map.try_insert(self.pose.x, self.pose.y, self.z)
        {
            debug!(total = self.map.len(), "Added visual map point");
        }

        self.feature_count = features.len();
        self.match_count = matches.len();
        self.previous = features;

        if self.frames_processed % 30 == 0 {
            debug!(
                frame = self.frames_processed,
                features = self.feature_count,
                matches = self.match_count,
                state = %self.tracking_state(),
                map_points = self.map.len(),
                "Visual odometry progress"
            );
        }

        Ok(self.snapshot())
    }

    /// Map points for display.
    ///
    /// Once past the warm-up with too few tracked points, this returns a
    /// ring of `Synthetic` points around the current pose instead. The ring
    /// is rebuilt on every call and never stored.
    pub fn display_map_points(&self) -> Vec<MapPoint> {
        let c = &self.config;
        if self.map.len() >= c.display_min_points || self.frames_processed <= c.display_warmup_frames {
            return self.map.points().to_vec();
        }
        let n = c.display_ring_size;
        (0..n)
            .map(|i| {
                let angle = i as f64 * TAU / n as f64;
                let radius = 2.0 + (i % 3) as f64 * 0.5;
                MapPoint {
                    x: self.pose.x + angle.cos() * radius,
                    y: self.pose.y + angle.sin() * radius,
                    z: self.z + (angle * 2.0).sin() * 0.3,
                    origin: MapPointOrigin::Synthetic,
                }
            })
            .collect()
    }

    /// Convex blend with a dead-reckoning pose, trusting vision in
    /// proportion to its tracking quality.
    pub fn fuse_with_dr(&self, dr: &Pose2D) -> Pose2D {
        blend_with_dr(
            &self.pose,
            self.quality,
            (self.config.min_visual_weight, self.config.max_visual_weight),
            dr,
        )
    }

    pub fn snapshot(&self) -> VisualSnapshot {
        VisualSnapshot {
            pose: self.pose,
            z: self.z,
            quality: self.quality,
            is_tracking: self.is_tracking,
            frames_processed: self.frames_processed,
            feature_count: self.feature_count,
            match_count: self.match_count,
            map_points: self.display_map_points(),
        }
    }
}

/// Weight is `quality` clamped to `bounds`.
fn blend_with_dr(visual: &Pose2D, quality: f64, bounds: (f64, f64), dr: &Pose2D) -> Pose2D {
    let w = quality.clamp(bounds.0, bounds.1);
    Pose2D::new(
        w * visual.x + (1.0 - w) * dr.x,
        w * visual.y + (1.0 - w) * dr.y,
        w * visual.theta + (1.0 - w) * dr.theta,
    )
}

impl Default for VisualOdometryEstimator {
    fn default() -> Self {
        Self::new(VisualOdometryConfig::default())
    }
}

impl PoseEstimator for VisualOdometryEstimator {
    fn pose(&self) -> Pose2D {
        self.pose
    }

    fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
    }
}

/// Shared access to one estimator from a camera thread and a fusion thread.
///
/// Frame processing serializes on the estimator mutex. Every processed frame
/// republishes a snapshot, which readers take without touching the mutex.
/// Lock order is always estimator, then snapshot.
#[derive(Debug, Clone)]
pub struct VisualOdometryHandle {
    estimator: Arc<Mutex<VisualOdometryEstimator>>,
    snapshot: Arc<RwLock<VisualSnapshot>>,
    weight_bounds: (f64, f64),
}

impl VisualOdometryHandle {
    pub fn new(config: VisualOdometryConfig) -> Self {
        let weight_bounds = (config.min_visual_weight, config.max_visual_weight);
        let estimator = VisualOdometryEstimator::new(config);
        let snapshot = estimator.snapshot();
        Self {
            estimator: Arc::new(Mutex::new(estimator)),
            snapshot: Arc::new(RwLock::new(snapshot)),
            weight_bounds,
        }
    }

    /// Processes a frame and publishes the result.
    ///
    /// Unreadable frames are logged and leave both the estimator and the
    /// published snapshot unchanged; `None` is returned.
    pub fn process_frame(
        &self,
        luma: &[u8],
        width: usize,
        height: usize,
        timestamp: f64,
    ) -> Option<VisualSnapshot> {
        let mut estimator = self.estimator.lock();
        match estimator.process_frame(luma, width, height, timestamp) {
            Ok(snapshot) => {
                *self.snapshot.write() = snapshot.clone();
                Some(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "Visual odometry skipped unreadable frame");
                None
            }
        }
    }

    /// The most recently published state.
    pub fn snapshot(&self) -> VisualSnapshot {
        self.snapshot.read().clone()
    }

    /// Read from the published snapshot; never waits on frame processing.
    pub fn tracking_state(&self) -> TrackingState {
        let snapshot = self.snapshot.read();
        TrackingState::from_flags(snapshot.is_tracking, snapshot.quality)
    }

    /// Blends against the published snapshot pose.
    pub fn fuse_with_dr(&self, dr: &Pose2D) -> Pose2D {
        let snapshot = self.snapshot.read();
        blend_with_dr(&snapshot.pose, snapshot.quality, self.weight_bounds, dr)
    }

    /// Runs `f` against the estimator while holding its lock.
    pub fn with_estimator<R>(&self, f: impl FnOnce(&VisualOdometryEstimator) -> R) -> R {
        f(&self.estimator.lock())
    }

    pub fn reset(&self) {
        let mut estimator = self.estimator.lock();
        estimator.reset();
        *self.snapshot.write() = estimator.snapshot();
        debug!("Visual odometry reset");
    }
}

impl Default for VisualOdometryHandle {
    fn default() -> Self {
        Self::new(VisualOdometryConfig::default())
    }
}
