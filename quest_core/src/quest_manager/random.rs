//! Random index selection behind a small port, so selection can be made
//! reproducible in tests and replays.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks an index in `0..len`. Callers never pass `len == 0`.
pub trait RandomSource: std::fmt::Debug + Send {
    fn pick(&mut self, len: usize) -> usize;
}

/// Production source backed by the thread-local RNG.
#[derive(Debug, Clone, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible source seeded once.
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Returns values from a fixed sequence, cycling, clamped to the range.
#[derive(Debug, Clone)]
pub struct FixedRandom {
    values: Vec<usize>,
    index: usize,
}

impl FixedRandom {
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, index: 0 }
    }

    /// Always pick the same index (clamped).
    pub fn constant(value: usize) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for FixedRandom {
    fn pick(&mut self, len: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value.min(len.saturating_sub(1))
    }
}
