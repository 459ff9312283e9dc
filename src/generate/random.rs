use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform randomness for phrase selection and synthetic data.
/// Production uses the thread RNG; tests inject a seeded RNG so generated
/// structures are reproducible.
pub trait RandomSource {
    /// Uniform index in 0..len. len must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Uniform f64 in [0, 1).
    fn unit(&mut self) -> f64;

    /// Pick one entry from a fixed pool.
    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool[self.index(pool.len())]
    }

    /// Uniform f64 in [lo, hi).
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.unit() * (hi - lo)
    }
}

/// Thread-RNG backed source (default).
#[derive(Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Deterministic source for tests.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
