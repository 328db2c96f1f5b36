//! Shared fixtures for the posefuse_core integration tests.

#![allow(dead_code)]

use posefuse_core::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const GRAVITY: f64 = 9.81;

pub fn resting_sample(dt: f64) -> ImuSample {
    ImuSample::new([0.0, 0.0, GRAVITY], [0.0; 3], dt)
}

pub fn fusion_with(dr: bool, slam: bool, visual: bool) -> FusionEngine {
    let mut config = PoseFusionConfig::default();
    config.fusion.dr_enabled = dr;
    config.fusion.slam_enabled = slam;
    config.fusion.visual_enabled = visual;
    FusionEngine::new(&config, VisualOdometryHandle::default()).expect("default config is valid")
}

/// Random small motions and nearby landmark sightings.
pub struct RandomWalk {
    rng: ChaCha8Rng,
}

impl RandomWalk {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn motion(&mut self) -> (f64, f64, f64) {
        (
            self.rng.gen_range(-0.2..0.3),
            self.rng.gen_range(-0.05..0.05),
            self.rng.gen_range(-0.2..0.2),
        )
    }

    pub fn measurements(&mut self, max_id: u64) -> Vec<RangeBearing> {
        let count = self.rng.gen_range(0..4);
        (0..count)
            .map(|_| {
                RangeBearing::new(
                    self.rng.gen_range(0.5..4.0),
                    self.rng.gen_range(-3.0..3.0),
                    LandmarkId(self.rng.gen_range(0..max_id)),
                )
            })
            .collect()
    }
}

/// Largest `|P - Pᵀ|` entry.
pub fn asymmetry(engine: &EkfSlamEngine) -> f64 {
    let p = engine.covariance();
    (p - p.transpose()).amax()
}
