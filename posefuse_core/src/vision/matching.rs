// posefuse_core/src/vision/matching.rs

use crate::vision::{FeatureMatch, FeaturePoint};

/// Greedy nearest-neighbour association between two feature sets.
///
/// Each of the first `max_candidates` current points is paired with the
/// closest of the first `max_candidates` previous points lying strictly
/// inside `radius`. A previous point may serve several current points.
pub fn match_nearest(
    current: &[FeaturePoint],
    previous: &[FeaturePoint],
    max_candidates: usize,
    radius: f32,
) -> Vec<FeatureMatch> {
    let radius_sq = radius * radius;
    let previous = &previous[..previous.len().min(max_candidates)];

    current
        .iter()
        .take(max_candidates)
        .filter_map(|curr| {
            let mut best: Option<(&FeaturePoint, f32)> = None;
            for prev in previous {
                let d2 = curr.distance_squared(prev);
                if d2 < radius_sq && best.map_or(true, |(_, b)| d2 < b) {
                    best = Some((prev, d2));
                }
            }
            best.map(|(prev, _)| FeatureMatch {
                current: *curr,
                previous: *prev,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f32, y: f32) -> FeaturePoint {
        FeaturePoint::new(x, y, 50.0)
    }

    #[test]
    fn test_picks_closest_within_radius() {
        let current = [pt(10.0, 10.0)];
        let previous = [pt(25.0, 10.0), pt(13.0, 10.0), pt(50.0, 50.0)];
        let m = match_nearest(&current, &previous, 60, 20.0);
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].previous, pt(13.0, 10.0));
        assert_eq!(m[0].flow(), (-3.0, 0.0));
    }

    #[test]
    fn test_radius_is_strict() {
        let m = match_nearest(&[pt(0.0, 0.0)], &[pt(20.0, 0.0)], 60, 20.0);
        assert!(m.is_empty());
    }

    #[test]
    fn test_previous_points_can_be_reused() {
        let current = [pt(0.0, 0.0), pt(2.0, 0.0)];
        let m = match_nearest(&current, &[pt(1.0, 0.0)], 60, 20.0);
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_candidate_cap_applies_to_both_sides() {
        let current: Vec<_> = (0..5).map(|i| pt(i as f32 * 100.0, 0.0)).collect();
        let m = match_nearest(&current, &current, 3, 5.0);
        assert_eq!(m.len(), 3);
        let m = match_nearest(&current[4..], &current, 3, 5.0);
        assert!(m.is_empty());
    }
}
