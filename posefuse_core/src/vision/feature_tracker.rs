// posefuse_core/src/vision/feature_tracker.rs

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::FeatureTrackerConfig;
use crate::messages::FeatureDetectionResult;
use crate::utils::stats::{clamp_norm, median};
use crate::vision::corners::detect_dense;
use crate::vision::image::LumaFrame;
use crate::vision::matching::match_nearest;
use crate::vision::{FeatureMatch, FeaturePoint};

/// The displacement produced by one accepted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEstimate {
    /// World-unit displacement applied this frame.
    pub dx: f64,
    pub dy: f64,
    /// Depth after this frame's update.
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No previous frame to match against.
    Idle,
    Tracking,
}

/// Frame-to-frame sparse flow tracker with a smoothed metric motion model.
///
/// Flow is converted to world units through a pinhole approximation with a
/// slowly relaxing depth, filtered through an exponential velocity model and
/// clamped per axis.
#[derive(Debug, Clone)]
pub struct FeatureTracker {
    config: FeatureTrackerConfig,
    state: TrackerState,
    previous: Vec<FeaturePoint>,
    history: VecDeque<Vec<FeaturePoint>>,
    velocity: (f64, f64),
    position: (f64, f64),
    depth: f64,
    frames_processed: u64,
}

impl FeatureTracker {
    pub fn new(config: FeatureTrackerConfig) -> Self {
        let depth = config.initial_depth;
        Self {
            state: TrackerState::Idle,
            previous: Vec::new(),
            history: VecDeque::with_capacity(config.history_depth),
            velocity: (0.0, 0.0),
            position: (0.0, 0.0),
            depth,
            frames_processed: 0,
            config,
        }
    }

    pub fn config(&self) -> &FeatureTrackerConfig {
        &self.config
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    pub fn velocity(&self) -> (f64, f64) {
        self.velocity
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Feature sets of recent frames, newest first. Visualization only.
    pub fn history(&self) -> impl Iterator<Item = &[FeaturePoint]> {
        self.history.iter().map(Vec::as_slice)
    }

    /// Runs detection, matching and motion estimation on one frame.
    ///
    /// A buffer that cannot be read as a `width x height` frame yields an
    /// empty result and leaves the tracker untouched.
    pub fn detect(&mut self, luma: &[u8], width: usize, height: usize) -> FeatureDetectionResult {
        let started = Instant::now();
        let frame = match LumaFrame::new(luma, width, height) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Dropping unreadable camera frame");
                return FeatureDetectionResult {
                    estimated_position: self.position,
                    ..Default::default()
                };
            }
        };

        let features = detect_dense(&frame, &self.config);

        self.history.push_front(features.clone());
        self.history.truncate(self.config.history_depth);

        let matches = if self.previous.is_empty() || features.is_empty() {
            Vec::new()
        } else {
            self.match_features(&features, &self.previous)
        };

        let filtered = self.filter_outliers(&matches);
        // Too few matches leaves the pose where it was.
        let _ = self.estimate_motion(&filtered);

        self.previous = features.clone();
        self.state = TrackerState::Tracking;
        self.frames_processed += 1;

        if !features.is_empty() {
            debug!(
                features = features.len(),
                matches = matches.len(),
                inliers = filtered.len(),
                x = self.position.0,
                y = self.position.1,
                "Tracked frame"
            );
        }

        FeatureDetectionResult {
            features,
            matches,
            estimated_position: self.position,
            processing_time_ms: started.elapsed().as_secs_f64() * 1e3,
        }
    }

    /// Nearest-neighbour association over the strongest candidates of each
    /// frame.
    pub fn match_features(&self, current: &[FeaturePoint], previous: &[FeaturePoint]) -> Vec<FeatureMatch> {
        match_nearest(
            current,
            previous,
            self.config.max_match_candidates,
            self.config.match_radius,
        )
    }

    /// Drops matches whose flow magnitude strays from the median magnitude,
    /// or that exceed the hard flow ceiling.
    pub fn filter_outliers(&self, matches: &[FeatureMatch]) -> Vec<FeatureMatch> {
        let Some(median_mag) = median(matches.iter().map(FeatureMatch::flow_magnitude)) else {
            return Vec::new();
        };
        let ceiling = self.config.outlier_flow_factor * self.config.max_flow_per_frame;
        matches
            .iter()
            .filter(|m| {
                let mag = m.flow_magnitude();
                (mag - median_mag).abs() <= self.config.outlier_tolerance && mag <= ceiling
            })
            .copied()
            .collect()
    }

    /// Integrates the median flow of `filtered` into position.
    ///
    /// Returns `None`, changing nothing, when fewer than `min_matches`
    /// survive.
    pub fn estimate_motion(&mut self, filtered: &[FeatureMatch]) -> Option<MotionEstimate> {
        if filtered.len() < self.config.min_matches {
            return None;
        }
        let c = &self.config;
        let flow_x = median(filtered.iter().map(|m| m.flow().0))?;
        let flow_y = median(filtered.iter().map(|m| m.flow().1))?;

        let (flow_x, flow_y) = if flow_x.hypot(flow_y) < c.flow_noise_floor {
            (0.0, 0.0)
        } else {
            clamp_norm(flow_x, flow_y, c.max_flow_per_frame)
        };

        let world_x = flow_x * self.depth / c.focal_length;
        let world_y = flow_y * self.depth / c.focal_length;

        let alpha = c.velocity_smoothing;
        let vx = alpha * self.velocity.0 + (1.0 - alpha) * world_x / c.frame_time;
        let vy = alpha * self.velocity.1 + (1.0 - alpha) * world_y / c.frame_time;
        self.velocity = (
            vx.clamp(-c.max_velocity, c.max_velocity),
            vy.clamp(-c.max_velocity, c.max_velocity),
        );

        let dx = self.velocity.0 * c.frame_time;
        let dy = self.velocity.1 * c.frame_time;
        self.position.0 += dx;
        self.position.1 += dy;

        self.depth = c.depth_retention * self.depth + (1.0 - c.depth_retention) * c.target_depth;

        Some(MotionEstimate {
            dx,
            dy,
            depth: self.depth,
        })
    }

    pub fn reset(&mut self) {
        self.state = TrackerState::Idle;
        self.previous.clear();
        self.history.clear();
        self.velocity = (0.0, 0.0);
        self.position = (0.0, 0.0);
        self.depth = self.config.initial_depth;
        self.frames_processed = 0;
        debug!("Feature tracker reset");
    }
}

impl Default for FeatureTracker {
    fn default() -> Self {
        Self::new(FeatureTrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn flow_match(dx: f32, dy: f32) -> FeatureMatch {
        FeatureMatch {
            previous: FeaturePoint::new(100.0, 100.0, 40.0),
            current: FeaturePoint::new(100.0 + dx, 100.0 + dy, 40.0),
        }
    }

    fn textured(w: usize, h: usize) -> Vec<u8> {
        (0..w * h)
            .map(|i| {
                let (x, y) = (i % w / 4, i / w / 4);
                ((x * 73 + y * 151 + x * y * 17) % 256) as u8
            })
            .collect()
    }

    #[test]
    fn test_outliers_are_rejected() {
        let tracker = FeatureTracker::default();
        let mut matches = vec![flow_match(2.0, 0.0); 9];
        matches.push(flow_match(50.0, 50.0));
        let kept = tracker.filter_outliers(&matches);
        assert_eq!(kept.len(), 9);
        assert!(kept.iter().all(|m| m.flow() == (2.0, 0.0)));
    }

    #[test]
    fn test_flow_ceiling_rejects_uniform_large_motion() {
        let tracker = FeatureTracker::default();
        let kept = tracker.filter_outliers(&vec![flow_match(40.0, 0.0); 5]);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_too_few_matches_hold_position() {
        let mut tracker = FeatureTracker::default();
        assert!(tracker.estimate_motion(&[flow_match(5.0, 0.0); 2]).is_none());
        assert_eq!(tracker.position(), (0.0, 0.0));
        assert_eq!(tracker.velocity(), (0.0, 0.0));
    }

    #[test]
    fn test_sub_pixel_flow_is_ignored() {
        let mut tracker = FeatureTracker::default();
        let est = tracker.estimate_motion(&[flow_match(0.3, 0.2); 4]).unwrap();
        assert_eq!((est.dx, est.dy), (0.0, 0.0));
    }

    #[test]
    fn test_flow_is_clamped_and_smoothed() {
        let mut tracker = FeatureTracker::default();
        let est = tracker.estimate_motion(&[flow_match(30.0, 0.0); 4]).unwrap();
        // 30 px clamps to 10 px: world 0.04, v = 0.1 * 0.04 * 30 = 0.12.
        assert_abs_diff_eq!(tracker.velocity().0, 0.12, epsilon = 1e-9);
        assert_abs_diff_eq!(est.dx, 0.004, epsilon = 1e-9);
        assert_abs_diff_eq!(est.depth, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_velocity_is_clamped_per_axis() {
        let config = FeatureTrackerConfig {
            max_velocity: 0.05,
            ..Default::default()
        };
        let mut tracker = FeatureTracker::new(config);
        for _ in 0..50 {
            tracker.estimate_motion(&[flow_match(-8.0, 8.0); 4]);
        }
        assert_abs_diff_eq!(tracker.velocity().0, -0.05);
        assert_abs_diff_eq!(tracker.velocity().1, 0.05);
    }

    #[test]
    fn test_depth_relaxes_toward_target() {
        let config = FeatureTrackerConfig {
            initial_depth: 4.0,
            ..Default::default()
        };
        let mut tracker = FeatureTracker::new(config);
        let est = tracker.estimate_motion(&[flow_match(1.0, 0.0); 3]).unwrap();
        assert_abs_diff_eq!(est.depth, 3.9, epsilon = 1e-12);
    }

    #[test]
    fn test_static_scene_tracks_without_moving() {
        let (w, h) = (160, 120);
        let frame = textured(w, h);
        let mut tracker = FeatureTracker::default();

        let first = tracker.detect(&frame, w, h);
        assert!(first.matches.is_empty());
        assert_eq!(tracker.state(), TrackerState::Tracking);

        let second = tracker.detect(&frame, w, h);
        assert!(!second.features.is_empty());
        assert_eq!(second.matches.len(), second.features.len().min(60));
        assert_eq!(second.estimated_position, (0.0, 0.0));
        assert_eq!(tracker.history().count(), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let (w, h) = (64, 48);
        let frame = textured(w, h);
        let mut tracker = FeatureTracker::default();
        for _ in 0..6 {
            tracker.detect(&frame, w, h);
        }
        assert_eq!(tracker.history().count(), 3);
    }

    #[test]
    fn test_bad_frame_leaves_state_untouched() {
        let mut tracker = FeatureTracker::default();
        let result = tracker.detect(&[0u8; 10], 100, 100);
        assert!(result.features.is_empty());
        assert!(result.matches.is_empty());
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert_eq!(tracker.frames_processed(), 0);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let (w, h) = (64, 48);
        let frame = textured(w, h);
        let mut tracker = FeatureTracker::default();
        tracker.detect(&frame, w, h);
        tracker.reset();
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert_eq!(tracker.history().count(), 0);
        assert_eq!(tracker.depth(), 2.0);
    }
}
