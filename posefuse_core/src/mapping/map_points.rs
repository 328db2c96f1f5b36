// posefuse_core/src/mapping/map_points.rs

use super::{MapPoint, MapPointOrigin};

/// A bounded set of tracked map points with a minimum spacing.
#[derive(Debug, Clone)]
pub struct MapPointStore {
    points: Vec<MapPoint>,
    min_spacing: f64,
    capacity: usize,
}

impl MapPointStore {
    pub fn new(min_spacing: f64, capacity: usize) -> Self {
        Self {
            points: Vec::new(),
            min_spacing,
            capacity,
        }
    }

    /// Inserts a tracked point unless the store is full or another point
    /// lies closer than the minimum spacing. Returns whether it was added.
    pub fn try_insert(&mut self, x: f64, y: f64, z: f64) -> bool {
        if self.points.len() >= self.capacity {
            return false;
        }
        if self
            .points
            .iter()
            .any(|p| p.distance_to(x, y, z) < self.min_spacing)
        {
            return false;
        }
        self.points.push(MapPoint {
            x,
            y,
            z,
            origin: MapPointOrigin::Tracked,
        });
        true
    }

    pub fn points(&self) -> &[MapPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
