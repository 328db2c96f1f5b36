// posefuse_core/src/vision/corners.rs

//! Grid-sampled corner detectors. Neither is scale or rotation invariant;
//! they only need to be repeatable between consecutive frames.

use crate::config::FeatureTrackerConfig;
use crate::vision::image::LumaFrame;
use crate::vision::FeaturePoint;

/// Half the summed absolute difference between a pixel and six of its
/// neighbours (right, left, below, above and both lower diagonals).
///
/// Pixels within 2 px of the border score 0. Integer division matches the
/// thresholds the detector was tuned against.
pub fn gradient_corner_score(frame: &LumaFrame<'_>, x: i64, y: i64) -> i32 {
    let (w, h) = (frame.width() as i64, frame.height() as i64);
    if x < 2 || x >= w - 2 || y < 2 || y >= h - 2 {
        return 0;
    }
    let c = frame.luminance(x, y);
    let diff = |dx: i64, dy: i64| (c - frame.luminance(x + dx, y + dy)).abs();
    let horizontal = diff(1, 0) + diff(-1, 0);
    let vertical = diff(0, 1) + diff(0, -1);
    let diagonal = diff(1, 1) + diff(-1, 1);
    (horizontal + vertical + diagonal) / 2
}

/// The weaker of the horizontal and vertical neighbour-difference sums.
///
/// Only an actual corner (gradient on both axes) scores high; neighbours
/// outside the frame are skipped.
pub fn axis_corner_score(frame: &LumaFrame<'_>, x: i64, y: i64) -> i32 {
    let Some(c) = frame.get(x, y) else {
        return 0;
    };
    let c = c as i32;
    let diff = |dx: i64, dy: i64| {
        frame
            .get(x + dx, y + dy)
            .map(|n| (c - n as i32).abs())
            .unwrap_or(0)
    };
    let horizontal = diff(-1, 0) + diff(1, 0);
    let vertical = diff(0, -1) + diff(0, 1);
    horizontal.min(vertical)
}

/// Interior grid coordinates: `pitch, 2*pitch, ...` strictly below `dim - pitch`.
fn grid(dim: usize, pitch: usize) -> impl Iterator<Item = usize> {
    (pitch..dim.saturating_sub(pitch)).step_by(pitch.max(1))
}

/// Dense detector used by the feature tracker.
///
/// Scans the interior grid, optionally probes the diagonal neighbours of
/// every accepted corner, then sweeps a band along all four edges. The
/// result is sorted strongest first and capped at `max_features`.
pub fn detect_dense(frame: &LumaFrame<'_>, config: &FeatureTrackerConfig) -> Vec<FeaturePoint> {
    let (w, h) = (frame.width(), frame.height());
    let mut features = Vec::new();
    let push = |features: &mut Vec<FeaturePoint>, x: usize, y: usize, score: i32| {
        features.push(FeaturePoint::new(x as f32, y as f32, score as f32));
    };

    for y in grid(h, config.grid_pitch) {
        for x in grid(w, config.grid_pitch) {
            let score = gradient_corner_score(frame, x as i64, y as i64);
            if (score as f32) <= config.corner_threshold {
                continue;
            }
            push(&mut features, x, y, score);

            if !config.neighbor_probe {
                continue;
            }
            let off = config.neighbor_probe_offset as i64;
            for sy in [-off, off] {
                for sx in [-off, off] {
                    let (px, py) = (x as i64 + sx, y as i64 + sy);
                    if px < 0 || py < 0 || px >= w as i64 || py >= h as i64 {
                        continue;
                    }
                    let sub = gradient_corner_score(frame, px, py);
                    if sub as f32 > config.neighbor_probe_threshold {
                        push(&mut features, px as usize, py as usize, sub);
                    }
                }
            }
        }
    }

    // Edge band
    let margin = config.border_margin;
    let step = config.border_step.max(1);
    let band = |features: &mut Vec<FeaturePoint>, x: usize, y: usize| {
        let score = gradient_corner_score(frame, x as i64, y as i64);
        if score as f32 > config.border_threshold {
            push(features, x, y, score);
        }
    };
    if w > 2 * margin {
        for x in (margin..w - margin).step_by(step) {
            band(&mut features, x, margin);
            band(&mut features, x, h.saturating_sub(margin));
        }
    }
    if h > 2 * margin {
        for y in (margin..h - margin).step_by(step) {
            band(&mut features, margin, y);
            band(&mut features, w.saturating_sub(margin), y);
        }
    }

    // Stable, so equal scores keep scan order.
    features.sort_by(|a, b| b.score.total_cmp(&a.score));
    features.truncate(config.max_features);
    features
}

/// Sparse detector used by the visual odometry estimator: interior grid
/// only, in scan order.
pub fn detect_sparse(frame: &LumaFrame<'_>, pitch: usize, threshold: i32) -> Vec<FeaturePoint> {
    let mut features = Vec::new();
    for y in grid(frame.height(), pitch) {
        for x in grid(frame.width(), pitch) {
            let score = axis_corner_score(frame, x as i64, y as i64);
            if score > threshold {
                features.push(FeaturePoint::new(x as f32, y as f32, score as f32));
            }
        }
    }
    features
}
