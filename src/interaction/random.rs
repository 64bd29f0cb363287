use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Randomness consumed by the live bar chart.
pub trait RandomSource {
    /// Uniform index in `0..len`; `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;
    /// `true` for an upward nudge.
    fn pick_direction(&mut self) -> bool;
}

/// `StdRng`-backed source; seeded for reproducible runs.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len.max(1))
    }

    fn pick_direction(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}
