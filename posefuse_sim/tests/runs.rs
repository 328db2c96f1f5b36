//! Full scenario runs through the threaded runner.

mod common;

use approx::assert_abs_diff_eq;
use posefuse_sim::prelude::*;

#[test]
fn test_noise_free_dead_reckoning_matches_truth() {
    let scenario = common::quiet_scenario(common::forward(0.4, 0.2), 4.0);
    let summary = run_scenario(&scenario).unwrap();
    assert_eq!(summary.imu_steps, 200);
    assert!(summary.truth.x > 0.5);
    assert_abs_diff_eq!(summary.error.fused.position, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(summary.error.fused.heading_deg, 0.0, epsilon = 1e-9);
    assert_eq!(summary.camera, CameraStats::default());
}

#[test]
fn test_noisy_stationary_run_stays_close() {
    let mut scenario = ScenarioConfig::default();
    scenario.simulation.duration_seconds = 5.0;
    scenario.camera.enabled = false;
    let summary = run_scenario(&scenario).unwrap();
    assert_eq!(summary.truth, Pose2D::ORIGIN);
    assert!(summary.error.fused.position < 0.2);
    assert!(summary.error.dr.is_some());
    assert!(summary.error.slam.is_none());
}

#[test]
fn test_same_seed_same_imu_pipeline() {
    let mut scenario = ScenarioConfig::default().with_seed(21);
    scenario.simulation.duration_seconds = 2.0;
    scenario.camera.enabled = false;
    scenario.core.fusion.slam_enabled = true;
    let a = run_scenario(&scenario).unwrap();
    let b = run_scenario(&scenario).unwrap();
    assert_eq!(a.result.fused_pose, b.result.fused_pose);
    assert_eq!(a.result.landmarks, b.result.landmarks);
}

#[test]
fn test_slam_run_maps_landmarks() {
    let mut scenario = common::quiet_scenario(common::forward(0.4, 0.15), 5.0);
    scenario.core.fusion.slam_enabled = true;
    let summary = run_scenario(&scenario).unwrap();
    assert!(summary.result.landmarks.len() >= 5);
    assert!(summary.result.fused_pose.is_finite());
    assert!(summary.error.slam.is_some());
}

#[test]
fn test_camera_frames_are_all_accounted_for() {
    let mut scenario = common::quiet_scenario(common::forward(0.3, 0.0), 3.0);
    scenario.camera.enabled = true;
    scenario.core.fusion.visual_enabled = true;
    let summary = run_scenario(&scenario).unwrap();

    let camera = &summary.camera;
    // 150 IMU ticks, one frame every 5.
    assert_eq!(camera.frames_rendered, 30);
    assert_eq!(
        camera.frames_processed + camera.frames_rejected,
        camera.frames_rendered - camera.frames_dropped
    );
    assert_eq!(camera.frames_rejected, 0);
    assert_eq!(
        camera.grade_good + camera.grade_medium + camera.grade_poor,
        camera.frames_processed
    );
    assert!(summary.error.visual.is_some());
}
