//! Seeded random sampling for reproducible jitter and tilt

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Stream salt separating cell jitter from other consumers of the run seed
pub const JITTER_STREAM: u64 = 0x6A17_7E12;
/// Stream salt separating tile tilt from other consumers of the run seed
pub const TILT_STREAM: u64 = 0x7117_A7E5;

/// Seeded sampler for reproducible stochastic choices
///
/// Each consumer derives its own stream from the run seed so that enabling
/// one randomized feature does not shift the values drawn by another.
pub struct SeededSampler {
    rng: StdRng,
}

impl SeededSampler {
    /// Create a sampler for the given seed and stream
    pub fn new(seed: u64, stream: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed ^ stream.rotate_left(17)),
        }
    }

    /// Uniform value in `[-bound, bound]`, exactly zero when `bound` is zero
    pub fn symmetric(&mut self, bound: f64) -> f64 {
        if bound <= 0.0 {
            return 0.0;
        }
        self.rng.random_range(-bound..=bound)
    }

    /// Uniform integer offset in `[-bound, bound]`
    pub fn offset(&mut self, bound: u32) -> i32 {
        if bound == 0 {
            return 0;
        }
        let bound = bound.min(i32::MAX as u32) as i32;
        self.rng.random_range(-bound..=bound)
    }
}
