//! Synthetic visibility generation
//!
//! Coordinates and both parts of each datum are drawn uniformly from
//! `[-1, 1)`. A fixed seed reproduces the same dataset on every run.

use crate::samples::VisibilitySet;
use num_complex::Complex32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used when none is supplied
pub const DEFAULT_SEED: u64 = 5489;

#[derive(Debug, Clone, Copy)]
pub struct SampleGenerator {
    seed: u64,
}

impl SampleGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw `n` samples: all `u` values first, then all `v`, then the data
    pub fn generate(&self, n: usize) -> VisibilitySet {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let u: Vec<f32> = (0..n).map(|_| rng.random_range(-1.0..1.0)).collect();
        let v: Vec<f32> = (0..n).map(|_| rng.random_range(-1.0..1.0)).collect();
        let data: Vec<Complex32> = (0..n)
            .map(|_| Complex32::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
            .collect();

        VisibilitySet::from_columns(u, v, data)
    }
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
