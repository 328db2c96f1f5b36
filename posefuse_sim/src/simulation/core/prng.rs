// posefuse_sim/src/simulation/core/prng.rs

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A newtype wrapper around `ChaCha8Rng`.
/// This is the central, deterministic pseudo-random number generator for a run.
#[derive(Debug, Clone)]
pub struct SimulationRng(pub ChaCha8Rng);

impl SimulationRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// An independent stream for one producer, derived from the run seed.
    pub fn fork(&self, stream: u64) -> Self {
        let mut rng = self.0.clone();
        rng.set_stream(stream);
        Self(rng)
    }
}
