// posefuse_sim/src/simulation/sensors/camera.rs

use posefuse_core::prelude::Pose2D;

use crate::simulation::config::CameraConfig;

/// One rendered luminance image plus its capture metadata.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub sequence: u64,
    pub timestamp: f64,
    pub width: usize,
    pub height: usize,
    pub luma: Vec<u8>,
}

/// A downward-looking camera over an infinite textured floor.
///
/// The floor is a grid of cells with a per-cell brightness, so cell corners
/// give strong gradient responses and the image shifts with the pose.
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    width: usize,
    height: usize,
    pixels_per_meter: f64,
    cell: f64,
    sequence: u64,
}

impl SyntheticCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            pixels_per_meter: config.pixels_per_meter,
            cell: config.checker_size as f64,
            sequence: 0,
        }
    }

    pub fn render(&mut self, pose: &Pose2D, timestamp: f64) -> CameraFrame {
        let (sin, cos) = pose.theta.sin_cos();
        let ox = pose.x * self.pixels_per_meter;
        let oy = pose.y * self.pixels_per_meter;
        let cx = self.width as f64 / 2.0;
        let cy = self.height as f64 / 2.0;

        let mut luma = Vec::with_capacity(self.width * self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                let dx = col as f64 - cx;
                let dy = row as f64 - cy;
                let wx = ox + cos * dx - sin * dy;
                let wy = oy + sin * dx + cos * dy;
                luma.push(self.floor_luma(wx, wy));
            }
        }

        self.sequence += 1;
        CameraFrame {
            sequence: self.sequence,
            timestamp,
            width: self.width,
            height: self.height,
            luma,
        }
    }

    fn floor_luma(&self, wx: f64, wy: f64) -> u8 {
        let i = (wx / self.cell).floor() as i64;
        let j = (wy / self.cell).floor() as i64;
        let base: i64 = if (i + j).rem_euclid(2) == 0 { 60 } else { 190 };
        let jitter = (cell_hash(i, j) % 61) as i64 - 30;
        (base + jitter).clamp(0, 255) as u8
    }
}

/// Stable per-cell value so neighbouring cells differ beyond the checker parity.
fn cell_hash(i: i64, j: i64) -> u64 {
    let mut h = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (j as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h ^= h >> 29;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^ (h >> 32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use posefuse_core::prelude::FeatureTracker;

    fn camera() -> SyntheticCamera {
        SyntheticCamera::new(&CameraConfig::default())
    }

    #[test]
    fn test_frame_dimensions_and_sequence() {
        let mut cam = camera();
        let a = cam.render(&Pose2D::ORIGIN, 0.0);
        let b = cam.render(&Pose2D::ORIGIN, 0.1);
        assert_eq!(a.luma.len(), 160 * 120);
        assert_eq!((a.sequence, b.sequence), (1, 2));
        assert_eq!(a.luma, b.luma);
    }

    #[test]
    fn test_translation_shifts_image() {
        let mut cam = camera();
        let a = cam.render(&Pose2D::ORIGIN, 0.0);
        // 0.1 m at 40 px/m is a 4 px shift along columns.
        let b = cam.render(&Pose2D::new(0.1, 0.0, 0.0), 0.1);
        let w = 160;
        for row in 10..110 {
            for col in 10..150 {
                assert_eq!(b.luma[row * w + col], a.luma[row * w + col + 4]);
            }
        }
    }

    #[test]
    fn test_texture_has_trackable_corners() {
        let mut cam = camera();
        let frame = cam.render(&Pose2D::ORIGIN, 0.0);
        let mut tracker = FeatureTracker::default();
        let result = tracker.detect(&frame.luma, frame.width, frame.height);
        assert!(result.features.len() >= 10);
    }
}
