//! Random sequence generation.

use std::ops::Range;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Values of generated sequences fall in this range.
pub const VALUE_RANGE: Range<u32> = 10..360;

/// Seedable source of fresh sequences.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    rng: SmallRng,
}

impl SequenceGenerator {
    /// A generator seeded with `seed`, or from the OS when `None`.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self { rng }
    }

    /// `len` values drawn uniformly from [`VALUE_RANGE`].
    pub fn generate(&mut self, len: usize) -> Vec<u32> {
        (0..len)
            .map(|_| self.rng.random_range(VALUE_RANGE))
            .collect()
    }
}
