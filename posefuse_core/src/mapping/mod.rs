// posefuse_core/src/mapping/mod.rs

use crate::types::LandmarkId;
use serde::{Deserialize, Serialize};

// --- Map Data Structures ---

/// A point landmark in the global frame, as estimated by EKF-SLAM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: LandmarkId,
    pub x: f64,
    pub y: f64,
    /// Number of measurements that referenced this landmark, including the
    /// one that created it.
    pub observed_count: u32,
}

/// Where a visual map point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapPointOrigin {
    /// Inserted while the visual estimator was tracking.
    Tracked,
    /// Generated for display only; carries no estimation value.
    Synthetic,
}

/// A 3-D point kept by the visual estimator for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub origin: MapPointOrigin,
}

impl MapPoint {
    pub fn distance_to(&self, x: f64, y: f64, z: f64) -> f64 {
        let (dx, dy, dz) = (self.x - x, self.y - y, self.z - z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

mod map_points;

pub use map_points::MapPointStore;
