//! Properties that must hold after any sequence of filter operations.

mod common;

use approx::assert_abs_diff_eq;
use posefuse_core::prelude::*;
use posefuse_core::utils::angles::normalize_angle;
use std::f64::consts::PI;

#[test]
fn test_state_and_covariance_shapes_stay_consistent() {
    for seed in 0..8 {
        let mut walk = common::RandomWalk::new(seed);
        let mut slam = EkfSlamEngine::default();
        let mut last_count = 0;

        for step in 0..60 {
            let (dx, dy, dtheta) = walk.motion();
            slam.predict(dx, dy, dtheta).unwrap();
            slam.update(&walk.measurements(6)).unwrap();

            let n = slam.state_dim();
            assert_eq!(n, 3 + 2 * slam.landmark_count(), "seed {seed} step {step}");
            assert_eq!(slam.covariance().shape(), (n, n));
            assert!(common::asymmetry(&slam) < 1e-9, "seed {seed} step {step}");
            assert!((0..n).all(|i| slam.covariance()[(i, i)].is_finite()));
            assert!(slam.landmark_count() >= last_count);
            last_count = slam.landmark_count();

            let theta = slam.pose().theta;
            assert!(theta > -PI && theta <= PI);
        }

        slam.reset();
        assert_eq!(slam.state_dim(), 3);
        assert_eq!(slam.covariance().shape(), (3, 3));
    }
}

#[test]
fn test_landmark_positions_match_state_vector() {
    let mut walk = common::RandomWalk::new(99);
    let mut slam = EkfSlamEngine::default();
    for _ in 0..40 {
        let (dx, dy, dtheta) = walk.motion();
        slam.predict(dx, dy, dtheta).unwrap();
        slam.update(&walk.measurements(4)).unwrap();
    }
    for slot in 0..slam.landmark_count() {
        let lm = slam.landmark_slot(slot).unwrap();
        assert_eq!(lm.x, slam.state_vector()[3 + 2 * slot]);
        assert_eq!(lm.y, slam.state_vector()[4 + 2 * slot]);
    }
}

#[test]
fn test_normalize_angle_is_periodic() {
    for i in -20..=20 {
        let a = i as f64 * 0.37;
        let base = normalize_angle(a);
        assert!(base > -PI && base <= PI);
        for k in [-3.0, -1.0, 1.0, 4.0] {
            assert_abs_diff_eq!(normalize_angle(a + 2.0 * PI * k), base, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_each_lone_source_is_reproduced_exactly() {
    let sample = ImuSample::new([0.5, -0.2, 9.81], [0.0, 0.0, -0.7], 0.05);
    for (dr, slam, visual) in [(true, false, false), (false, true, false), (false, false, true)] {
        let mut fusion = common::fusion_with(dr, slam, visual);
        for _ in 0..30 {
            let r = fusion.update_imu(&sample);
            let expected = if dr {
                r.dr_pose
            } else if slam {
                r.slam_pose
            } else {
                r.visual_pose
            };
            assert_eq!(r.fused_pose, expected);
        }
    }
}
