// posefuse_sim/src/simulation/runner.rs

//! Drives one scenario end to end.
//!
//! The calling thread owns the IMU pipeline: synthetic samples go through
//! `FusionEngine::update_imu` at the IMU rate. Rendered camera frames are
//! handed to a worker thread through a keep-latest slot; the worker runs the
//! feature tracker and the shared visual odometry estimator, whose published
//! snapshot the fusion engine samples on the next IMU tick.

use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use posefuse_core::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, SimError};
use crate::simulation::config::ScenarioConfig;
use crate::simulation::core::frame_channel::{latest_channel, LatestSender};
use crate::simulation::core::ground_truth::GroundTruthState;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::debugging::state_error::{log_state_error, StateErrorReport};
use crate::simulation::sensors::{CameraFrame, SyntheticCamera, SyntheticImu};

const IMU_STREAM: u64 = 1;

// =========================================================================
// == Run Outputs ==
// =========================================================================

/// What the camera worker saw over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CameraStats {
    pub frames_rendered: u64,
    /// Frames replaced in the slot before the worker picked them up.
    pub frames_dropped: u64,
    pub frames_processed: u64,
    pub frames_rejected: u64,
    pub grade_good: u64,
    pub grade_medium: u64,
    pub grade_poor: u64,
}

impl CameraStats {
    fn record_grade(&mut self, grade: TrackingGrade) {
        match grade {
            TrackingGrade::Good => self.grade_good += 1,
            TrackingGrade::Medium => self.grade_medium += 1,
            TrackingGrade::Poor => self.grade_poor += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub imu_steps: usize,
    pub camera: CameraStats,
    pub truth: Pose2D,
    pub error: StateErrorReport,
    pub result: FusionResult,
}

// =========================================================================
// == Camera Pipeline ==
// =========================================================================

struct CameraPipeline {
    sender: LatestSender<CameraFrame>,
    worker: JoinHandle<CameraStats>,
}

impl CameraPipeline {
    fn spawn(visual: VisualOdometryHandle, tracker: FeatureTrackerConfig) -> Result<Self> {
        let (sender, frames) = latest_channel();
        let worker = thread::Builder::new()
            .name("camera".into())
            .spawn(move || camera_worker(frames, visual, FeatureTracker::new(tracker)))
            .map_err(|e| {
                warn!("Failed to spawn camera thread: {}", e);
                SimError::Thread("camera")
            })?;
        Ok(Self { sender, worker })
    }

    fn submit(&mut self, frame: CameraFrame) -> Result<()> {
        self.sender.send_latest(frame)
    }

    /// Closes the slot and waits for the worker to drain it.
    fn finish(self) -> Result<CameraStats> {
        let CameraPipeline { sender, worker } = self;
        let (rendered, dropped) = (sender.sent(), sender.dropped());
        drop(sender);
        let mut stats = worker.join().map_err(|_| SimError::Thread("camera"))?;
        stats.frames_rendered = rendered;
        stats.frames_dropped = dropped;
        Ok(stats)
    }
}

fn camera_worker(
    frames: Receiver<CameraFrame>,
    visual: VisualOdometryHandle,
    mut tracker: FeatureTracker,
) -> CameraStats {
    let mut stats = CameraStats::default();
    for frame in frames.iter() {
        let detection = tracker.detect(&frame.luma, frame.width, frame.height);
        stats.record_grade(detection.tracking_grade());

        match visual.process_frame(&frame.luma, frame.width, frame.height, frame.timestamp) {
            Some(snapshot) => {
                stats.frames_processed += 1;
                debug!(
                    frame = frame.sequence,
                    features = detection.features.len(),
                    matches = detection.matches.len(),
                    vo_quality = snapshot.quality,
                    "Camera frame processed"
                );
            }
            None => stats.frames_rejected += 1,
        }
    }
    stats
}

// =========================================================================
// == Scenario Runner ==
// =========================================================================

pub fn run_scenario(scenario: &ScenarioConfig) -> Result<RunSummary> {
    scenario.validate()?;
    let name = scenario.simulation.name.as_str();
    let steps = scenario.total_steps();
    let camera_stride = scenario.camera_stride();
    let report_stride = scenario.report_stride();
    info!(
        "Running scenario '{}': {} IMU ticks, camera every {} ticks, seed {}",
        name, steps, camera_stride, scenario.simulation.seed
    );

    let rng = SimulationRng::from_seed(scenario.simulation.seed);
    let mut imu = SyntheticImu::new(&scenario.imu, rng.fork(IMU_STREAM))?;
    let mut truth = GroundTruthState::new(scenario.core.fusion.dr_speed_gain);
    let visual = VisualOdometryHandle::new(scenario.core.visual.clone());
    let mut engine = FusionEngine::new(&scenario.core, visual.clone())?;
    let flags = engine.flags();
    info!(
        "Sources enabled | dr: {} | slam: {} | visual: {}",
        flags.dr, flags.slam, flags.visual
    );

    let mut camera = SyntheticCamera::new(&scenario.camera);
    let mut pipeline = if scenario.camera.enabled {
        Some(CameraPipeline::spawn(visual.clone(), scenario.core.tracker.clone())?)
    } else {
        None
    };

    let mut result = engine.last_result().clone();
    for step in 0..steps {
        let t = step as f64 * imu.dt();
        let ideal = imu.ideal(&scenario.motion, t);
        let measured = imu.measure(&ideal);
        let true_pose = truth.advance(&ideal);
        result = engine.update_imu(&measured);

        if let Some(pipeline) = pipeline.as_mut() {
            if step % camera_stride == 0 {
                pipeline.submit(camera.render(&true_pose, truth.time()))?;
            }
        }

        if (step + 1) % report_stride == 0 {
            log_state_error(name, &true_pose, &result);
        }
    }

    let camera_stats = match pipeline {
        Some(p) => p.finish()?,
        None => CameraStats::default(),
    };

    let final_truth = truth.pose();
    let error = StateErrorReport::new(&final_truth, &result);
    let summary = RunSummary {
        scenario: name.to_string(),
        imu_steps: steps,
        camera: camera_stats,
        truth: final_truth,
        error,
        result,
    };
    log_summary(&summary, visual.tracking_state());
    Ok(summary)
}

fn log_summary(summary: &RunSummary, tracking: TrackingState) {
    info!(
        "[{}] Finished after {} IMU ticks | truth {} | fused {} | Pos Err: {:.3}m | Att Err: {:.3}°",
        summary.scenario,
        summary.imu_steps,
        summary.truth,
        summary.result.fused_pose,
        summary.error.fused.position,
        summary.error.fused.heading_deg
    );
    if summary.result.flags.slam {
        info!(
            "[{}] SLAM landmarks: {}",
            summary.scenario,
            summary.result.landmarks.len()
        );
    }
    let camera = &summary.camera;
    if camera.frames_rendered > 0 {
        info!(
            "[{}] Camera frames rendered: {} | processed: {} | dropped: {} | rejected: {} | grades good/medium/poor: {}/{}/{} | visual odometry: {}",
            summary.scenario,
            camera.frames_rendered,
            camera.frames_processed,
            camera.frames_dropped,
            camera.frames_rejected,
            camera.grade_good,
            camera.grade_medium,
            camera.grade_poor,
            tracking
        );
    }
}
