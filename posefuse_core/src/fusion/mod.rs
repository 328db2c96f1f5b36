// posefuse_core/src/fusion/mod.rs

//! Runs the three pose sources side by side and blends them.
//!
//! Dead reckoning and EKF-SLAM are stepped on every IMU sample; the visual
//! estimator runs on its own camera cadence and is only sampled here
//! through its published snapshot.

use tracing::{debug, warn};

use crate::config::{FusionConfig, PoseFusionConfig};
use crate::error::ConfigError;
use crate::estimation::{DeadReckoning, EkfSlamEngine, PoseEstimator};
use crate::mapping::MapPoint;
use crate::messages::{FusionResult, ImuSample, SourceFlags};
use crate::models::perception::{LandmarkSensor, SimulatedLandmarkSensor};
use crate::types::Pose2D;
use crate::utils::angles::normalize_angle;
use crate::vision::VisualOdometryHandle;

#[derive(Debug)]
pub struct FusionEngine {
    config: FusionConfig,
    flags: SourceFlags,
    dead_reckoning: DeadReckoning,
    slam: EkfSlamEngine,
    sensor: Box<dyn LandmarkSensor>,
    visual: VisualOdometryHandle,
    visual_pose: Pose2D,
    visual_z: f64,
    visual_map_points: Vec<MapPoint>,
    fused_pose: Pose2D,
    timestamp: f64,
    last_result: FusionResult,
}

impl FusionEngine {
    /// Builds the engine around an existing visual estimator handle, which
    /// the caller typically shares with a camera thread.
    pub fn new(config: &PoseFusionConfig, visual: VisualOdometryHandle) -> Result<Self, ConfigError> {
        config.validate()?;
        let fusion = config.fusion.clone();
        let sensor = SimulatedLandmarkSensor::new(fusion.landmark_sensor.clone())?;
        let flags = SourceFlags {
            dr: fusion.dr_enabled,
            slam: fusion.slam_enabled,
            visual: fusion.visual_enabled,
        };
        let mut engine = Self {
            dead_reckoning: DeadReckoning::new(fusion.dr_speed_gain),
            slam: EkfSlamEngine::new(config.slam.clone()),
            sensor: Box::new(sensor),
            visual,
            flags,
            visual_pose: Pose2D::ORIGIN,
            visual_z: 0.0,
            visual_map_points: Vec::new(),
            fused_pose: Pose2D::ORIGIN,
            timestamp: 0.0,
            last_result: empty_result(flags),
            config: fusion,
        };
        engine.last_result = engine.compose_result();
        Ok(engine)
    }

    /// Replaces the landmark measurement source used by the SLAM path.
    pub fn with_landmark_sensor(mut self, sensor: Box<dyn LandmarkSensor>) -> Self {
        self.sensor = sensor;
        self
    }

    // --- Source toggles. None of these reset accumulated state. ---

    pub fn enable_dr(&mut self, enabled: bool) {
        self.flags.dr = enabled;
    }

    pub fn enable_slam(&mut self, enabled: bool) {
        self.flags.slam = enabled;
    }

    pub fn enable_visual_odometry(&mut self, enabled: bool) {
        self.flags.visual = enabled;
    }

    pub fn flags(&self) -> SourceFlags {
        self.flags
    }

    pub fn slam(&self) -> &EkfSlamEngine {
        &self.slam
    }

    pub fn visual_handle(&self) -> &VisualOdometryHandle {
        &self.visual
    }

    pub fn last_result(&self) -> &FusionResult {
        &self.last_result
    }

    /// Advances every enabled source by one IMU sample and blends them.
    ///
    /// A sample with a non-positive or non-finite `dt` changes nothing and
    /// returns the previous result.
    pub fn update_imu(&mut self, sample: &ImuSample) -> FusionResult {
        let finite = sample.accel.iter().chain(sample.gyro.iter()).all(|v| v.is_finite());
        if !(sample.dt.is_finite() && sample.dt > 0.0) || !finite {
            debug!(dt = sample.dt, "Ignoring IMU sample");
            return self.last_result.clone();
        }
        self.timestamp += sample.dt;

        let delta = DeadReckoning::odometry_from_imu(sample, self.config.dr_speed_gain);

        if self.flags.dr {
            self.dead_reckoning.apply(&delta);
        }

        if self.flags.slam {
            self.slam.set_reference_pose(self.dead_reckoning.pose());
            if let Err(e) = self.slam.predict(delta.dx, delta.dy, delta.dtheta) {
                warn!(error = %e, "SLAM prediction failed");
            }
            let measurements = self.sensor.observe(&self.slam.pose());
            if let Err(e) = self.slam.update(&measurements) {
                warn!(error = %e, "SLAM update failed");
            }
        }

        if self.flags.visual {
            let snapshot = self.visual.snapshot();
            self.visual_pose = snapshot.pose;
            self.visual_z = snapshot.z;
            self.visual_map_points = snapshot.map_points;
        }

        if let Some(fused) = self.blend() {
            self.fused_pose = fused;
        }

        self.last_result = self.compose_result();
        self.last_result.clone()
    }

    /// Weighted mean of the enabled poses, or `None` when nothing is enabled.
    fn blend(&self) -> Option<Pose2D> {
        let sources = [
            (self.flags.dr, self.dead_reckoning.pose(), self.config.dr_weight),
            (self.flags.slam, self.slam.pose(), self.config.slam_weight),
            (self.flags.visual, self.visual_pose, self.config.visual_weight),
        ];
        let total: f64 = sources.iter().filter(|s| s.0).map(|s| s.2).sum();
        if total <= 0.0 {
            return None;
        }

        // Normalize first so a lone source passes through unchanged.
        let (mut x, mut y, mut theta) = (0.0, 0.0, 0.0);
        for (_, pose, weight) in sources.iter().filter(|s| s.0) {
            let w = weight / total;
            x += w * pose.x;
            y += w * pose.y;
            theta += w * pose.theta;
        }
        Some(Pose2D {
            x,
            y,
            theta: normalize_angle(theta),
        })
    }

    fn compose_result(&self) -> FusionResult {
        FusionResult {
            dr_pose: self.dead_reckoning.pose(),
            slam_pose: self.slam.pose(),
            visual_pose: self.visual_pose,
            visual_z: self.visual_z,
            fused_pose: self.fused_pose,
            landmarks: if self.flags.slam {
                self.slam.landmarks().to_vec()
            } else {
                Vec::new()
            },
            visual_map_points: if self.flags.visual {
                self.visual_map_points.clone()
            } else {
                Vec::new()
            },
            flags: self.flags,
            timestamp: self.timestamp,
        }
    }

    /// Zeroes every pose and resets the SLAM engine, the landmark sensor and
    /// the shared visual estimator. Source flags are kept.
    pub fn reset(&mut self) {
        self.dead_reckoning.reset();
        self.slam.reset();
        self.sensor.reset();
        self.visual.reset();
        self.visual_pose = Pose2D::ORIGIN;
        self.visual_z = 0.0;
        self.visual_map_points.clear();
        self.fused_pose = Pose2D::ORIGIN;
        self.timestamp = 0.0;
        self.last_result = self.compose_result();
        debug!("Fusion engine reset");
    }
}

fn empty_result(flags: SourceFlags) -> FusionResult {
    FusionResult {
        dr_pose: Pose2D::ORIGIN,
        slam_pose: Pose2D::ORIGIN,
        visual_pose: Pose2D::ORIGIN,
        visual_z: 0.0,
        fused_pose: Pose2D::ORIGIN,
        landmarks: Vec::new(),
        visual_map_points: Vec::new(),
        flags,
        timestamp: 0.0,
    }
}
