// posefuse_core/src/config.rs

//! Every heuristic constant of the estimators, in one serde-friendly tree.
//!
//! Each struct fills missing fields from its `Default`, so a scenario file
//! only needs to name the values it changes.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoseFusionConfig {
    pub tracker: FeatureTrackerConfig,
    pub slam: EkfSlamConfig,
    pub visual: VisualOdometryConfig,
    pub fusion: FusionConfig,
}

impl PoseFusionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracker.validate()?;
        self.slam.validate()?;
        self.visual.validate()?;
        self.fusion.validate()
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::new(field, format!("must be > 0, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::new(field, format!("must be >= 0, got {}", value)))
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::new(field, format!("must be in [0, 1], got {}", value)))
    }
}

fn non_zero(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::new(field, "must be > 0"))
    }
}

// =========================================================================
// == Feature Tracker ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureTrackerConfig {
    /// Spacing of the interior detection grid, in pixels.
    pub grid_pitch: usize,
    pub corner_threshold: f32,
    /// Probe the four diagonal neighbours of every accepted grid corner.
    pub neighbor_probe: bool,
    pub neighbor_probe_offset: usize,
    pub neighbor_probe_threshold: f32,
    pub border_margin: usize,
    pub border_step: usize,
    pub border_threshold: f32,
    /// Strongest-K cap on the retained feature set.
    pub max_features: usize,
    /// How many of the strongest points on each side take part in matching.
    pub max_match_candidates: usize,
    pub match_radius: f32,
    /// Allowed deviation from the median flow magnitude, in pixels.
    pub outlier_tolerance: f64,
    /// Matches above `outlier_flow_factor * max_flow_per_frame` are dropped.
    pub outlier_flow_factor: f64,
    pub min_matches: usize,
    pub flow_noise_floor: f64,
    pub max_flow_per_frame: f64,
    pub focal_length: f64,
    /// Nominal frame period in seconds.
    pub frame_time: f64,
    /// Weight of the previous velocity in the exponential filter.
    pub velocity_smoothing: f64,
    pub max_velocity: f64,
    pub initial_depth: f64,
    pub target_depth: f64,
    pub depth_retention: f64,
    pub history_depth: usize,
}

impl Default for FeatureTrackerConfig {
    fn default() -> Self {
        Self {
            grid_pitch: 12,
            corner_threshold: 20.0,
            neighbor_probe: true,
            neighbor_probe_offset: 2,
            neighbor_probe_threshold: 15.0,
            border_margin: 8,
            border_step: 10,
            border_threshold: 25.0,
            max_features: 150,
            max_match_candidates: 60,
            match_radius: 20.0,
            outlier_tolerance: 10.0,
            outlier_flow_factor: 3.0,
            min_matches: 3,
            flow_noise_floor: 0.5,
            max_flow_per_frame: 10.0,
            focal_length: 500.0,
            frame_time: 1.0 / 30.0,
            velocity_smoothing: 0.9,
            max_velocity: 1.5,
            initial_depth: 2.0,
            target_depth: 2.0,
            depth_retention: 0.95,
            history_depth: 3,
        }
    }
}

impl FeatureTrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero("tracker.grid_pitch", self.grid_pitch)?;
        non_zero("tracker.border_step", self.border_step)?;
        non_zero("tracker.max_features", self.max_features)?;
        positive("tracker.match_radius", self.match_radius as f64)?;
        positive("tracker.focal_length", self.focal_length)?;
        positive("tracker.frame_time", self.frame_time)?;
        positive("tracker.max_flow_per_frame", self.max_flow_per_frame)?;
        non_negative("tracker.outlier_tolerance", self.outlier_tolerance)?;
        non_negative("tracker.max_velocity", self.max_velocity)?;
        unit_interval("tracker.velocity_smoothing", self.velocity_smoothing)?;
        unit_interval("tracker.depth_retention", self.depth_retention)
    }
}

// =========================================================================
// == EKF-SLAM ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EkfSlamConfig {
    /// Diagonal of the initial 3x3 robot covariance.
    pub initial_pose_variance: f64,
    /// Q = diag(scale*|dx|, scale*|dy|, scale*|dtheta|).
    pub motion_noise_scale: f64,
    /// Multiplier applied to every landmark variance on each predict.
    pub landmark_drift_factor: f64,
    pub new_landmark_variance: f64,
    pub range_noise: f64,
    pub bearing_noise: f64,
    /// Measurements closer than this are rejected as degenerate.
    pub min_range: f64,
}

impl Default for EkfSlamConfig {
    fn default() -> Self {
        Self {
            initial_pose_variance: 0.01,
            motion_noise_scale: 0.01,
            landmark_drift_factor: 1.01,
            new_landmark_variance: 100.0,
            range_noise: 0.1,
            bearing_noise: 0.05,
            min_range: 1e-6,
        }
    }
}

impl EkfSlamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("slam.initial_pose_variance", self.initial_pose_variance)?;
        non_negative("slam.motion_noise_scale", self.motion_noise_scale)?;
        positive("slam.landmark_drift_factor", self.landmark_drift_factor)?;
        positive("slam.new_landmark_variance", self.new_landmark_variance)?;
        positive("slam.range_noise", self.range_noise)?;
        positive("slam.bearing_noise", self.bearing_noise)?;
        positive("slam.min_range", self.min_range)
    }
}

// =========================================================================
// == Visual Odometry ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualOdometryConfig {
    pub grid_pitch: usize,
    pub corner_threshold: i32,
    pub max_match_candidates: usize,
    pub match_radius: f64,
    pub min_matches: usize,
    /// World units per pixel of mean flow.
    pub flow_scale: f64,
    pub yaw_min_features: usize,
    pub yaw_sample_size: usize,
    pub yaw_scale: f64,
    pub z_amplitude: f64,
    pub z_period_s: f64,
    /// Quality above which the estimator counts as tracking.
    pub tracking_threshold: f64,
    pub map_point_interval: u64,
    pub map_point_min_matches: usize,
    pub map_point_min_spacing: f64,
    pub map_point_capacity: usize,
    pub display_min_points: usize,
    pub display_warmup_frames: u64,
    pub display_ring_size: usize,
    pub min_visual_weight: f64,
    pub max_visual_weight: f64,
}

impl Default for VisualOdometryConfig {
    fn default() -> Self {
        Self {
            grid_pitch: 20,
            corner_threshold: 50,
            max_match_candidates: 50,
            match_radius: 30.0,
            min_matches: 5,
            flow_scale: 0.001,
            yaw_min_features: 10,
            yaw_sample_size: 20,
            yaw_scale: 1e-6,
            z_amplitude: 0.1,
            z_period_s: 5.0,
            tracking_threshold: 0.3,
            map_point_interval: 20,
            map_point_min_matches: 10,
            map_point_min_spacing: 0.5,
            map_point_capacity: 100,
            display_min_points: 10,
            display_warmup_frames: 30,
            display_ring_size: 20,
            min_visual_weight: 0.1,
            max_visual_weight: 0.8,
        }
    }
}

impl VisualOdometryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero("visual.grid_pitch", self.grid_pitch)?;
        non_zero("visual.min_matches", self.min_matches)?;
        positive("visual.match_radius", self.match_radius)?;
        positive("visual.z_period_s", self.z_period_s)?;
        non_negative("visual.map_point_min_spacing", self.map_point_min_spacing)?;
        unit_interval("visual.min_visual_weight", self.min_visual_weight)?;
        unit_interval("visual.max_visual_weight", self.max_visual_weight)?;
        if self.min_visual_weight > self.max_visual_weight {
            return Err(ConfigError::new(
                "visual.min_visual_weight",
                "must not exceed max_visual_weight",
            ));
        }
        Ok(())
    }
}

// =========================================================================
// == Fusion ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FusionConfig {
    pub dr_enabled: bool,
    pub slam_enabled: bool,
    pub visual_enabled: bool,
    pub dr_weight: f64,
    pub slam_weight: f64,
    pub visual_weight: f64,
    /// speed = |a_xy| * dt * dr_speed_gain.
    pub dr_speed_gain: f64,
    pub landmark_sensor: SimulatedLandmarkConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            dr_enabled: true,
            slam_enabled: false,
            visual_enabled: false,
            dr_weight: 0.3,
            slam_weight: 0.4,
            visual_weight: 0.5,
            dr_speed_gain: 0.5,
            landmark_sensor: SimulatedLandmarkConfig::default(),
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("fusion.dr_weight", self.dr_weight)?;
        non_negative("fusion.slam_weight", self.slam_weight)?;
        non_negative("fusion.visual_weight", self.visual_weight)?;
        non_negative("fusion.dr_speed_gain", self.dr_speed_gain)?;
        self.landmark_sensor.validate()
    }
}

/// The stand-in landmark sensor: fixed landmarks observed with uniform jitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatedLandmarkConfig {
    /// Landmark positions; the index in this list is the signature.
    pub landmarks: Vec<[f64; 2]>,
    pub max_range: f64,
    /// Half-width of the uniform range jitter.
    pub range_jitter: f64,
    /// Half-width of the uniform bearing jitter, radians.
    pub bearing_jitter: f64,
    pub seed: u64,
}

impl Default for SimulatedLandmarkConfig {
    fn default() -> Self {
        Self {
            landmarks: vec![
                [2.0, 0.0],
                [3.0, 1.0],
                [1.0, 2.0],
                [4.0, 3.0],
                [-2.0, 1.0],
                [-1.0, 3.0],
            ],
            max_range: 5.0,
            range_jitter: 0.025,
            bearing_jitter: 0.005,
            seed: 0,
        }
    }
}

impl SimulatedLandmarkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fusion.landmark_sensor.max_range", self.max_range)?;
        non_negative("fusion.landmark_sensor.range_jitter", self.range_jitter)?;
        non_negative("fusion.landmark_sensor.bearing_jitter", self.bearing_jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PoseFusionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_field() {
        let mut config = PoseFusionConfig::default();
        config.slam.range_noise = 0.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "slam.range_noise");
    }

    #[test]
    fn test_visual_weight_bounds_are_ordered() {
        let mut config = VisualOdometryConfig::default();
        config.min_visual_weight = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_min_matches_is_rejected() {
        let mut config = PoseFusionConfig::default();
        config.visual.min_matches = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "visual.min_matches");
    }
}
