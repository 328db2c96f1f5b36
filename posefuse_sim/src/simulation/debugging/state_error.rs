// posefuse_sim/src/simulation/debugging/state_error.rs

use posefuse_core::prelude::{FusionResult, Pose2D};
use posefuse_core::utils::angles::angle_difference;
use serde::Serialize;
use tracing::info;

// =========================================================================
// == Pose Error ==
// =========================================================================

/// Distance between a true and an estimated planar pose.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PoseError {
    /// Euclidean position error, meters.
    pub position: f64,
    /// Absolute wrapped heading error, degrees.
    pub heading_deg: f64,
}

impl PoseError {
    pub fn between(truth: &Pose2D, estimate: &Pose2D) -> Self {
        Self {
            position: truth.distance_to(estimate),
            heading_deg: angle_difference(truth.theta, estimate.theta).abs().to_degrees(),
        }
    }
}

/// Errors of every pose in a fusion result. Disabled sources are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StateErrorReport {
    pub fused: PoseError,
    pub dr: Option<PoseError>,
    pub slam: Option<PoseError>,
    pub visual: Option<PoseError>,
}

impl StateErrorReport {
    pub fn new(truth: &Pose2D, result: &FusionResult) -> Self {
        let flags = result.flags;
        Self {
            fused: PoseError::between(truth, &result.fused_pose),
            dr: flags.dr.then(|| PoseError::between(truth, &result.dr_pose)),
            slam: flags.slam.then(|| PoseError::between(truth, &result.slam_pose)),
            visual: flags.visual.then(|| PoseError::between(truth, &result.visual_pose)),
        }
    }
}

// =========================================================================
// == Error Logging ==
// =========================================================================

/// Computes and logs the error between the ground truth and the estimates.
pub fn log_state_error(scenario: &str, truth: &Pose2D, result: &FusionResult) -> StateErrorReport {
    let report = StateErrorReport::new(truth, result);
    info!(
        "[{}] t={:.2}s State Error | Fused Pos Err: {:.3}m | Att Err: {:.3}° | truth {} fused {}",
        scenario,
        result.timestamp,
        report.fused.position,
        report.fused.heading_deg,
        truth,
        result.fused_pose
    );
    for (label, error) in [("dr", report.dr), ("slam", report.slam), ("visual", report.visual)] {
        if let Some(e) = error {
            info!(
                "[{}]   {:<6} Pos Err: {:.3}m | Att Err: {:.3}°",
                scenario, label, e.position, e.heading_deg
            );
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use posefuse_core::prelude::SourceFlags;
    use std::f64::consts::PI;

    #[test]
    fn test_heading_error_wraps() {
        let truth = Pose2D::new(0.0, 0.0, PI - 0.01);
        let estimate = Pose2D::new(3.0, 4.0, -PI + 0.01);
        let e = PoseError::between(&truth, &estimate);
        assert_abs_diff_eq!(e.position, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.heading_deg, 0.02_f64.to_degrees(), epsilon = 1e-9);
    }

    #[test]
    fn test_disabled_sources_are_skipped() {
        let result = FusionResult {
            dr_pose: Pose2D::new(1.0, 0.0, 0.0),
            slam_pose: Pose2D::ORIGIN,
            visual_pose: Pose2D::ORIGIN,
            visual_z: 0.0,
            fused_pose: Pose2D::new(1.0, 0.0, 0.0),
            landmarks: Vec::new(),
            visual_map_points: Vec::new(),
            flags: SourceFlags {
                dr: true,
                slam: false,
                visual: false,
            },
            timestamp: 1.0,
        };
        let report = StateErrorReport::new(&Pose2D::ORIGIN, &result);
        assert_abs_diff_eq!(report.dr.unwrap().position, 1.0);
        assert!(report.slam.is_none());
        assert!(report.visual.is_none());
    }
}
