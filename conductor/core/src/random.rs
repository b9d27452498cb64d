//! Injectable randomness for ambient effects

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform values in `[0.0, 1.0)`
pub trait RandomSource {
    /// Next uniform value
    fn next_unit(&mut self) -> f64;
}

/// `rand`-backed source used outside of tests
#[derive(Debug)]
pub struct StdRandom(StdRng);

impl StdRandom {
    /// Seed from the operating system
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Reproducible sequence for a given seed
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed list of values, then repeats `fallback`
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    values: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    /// Replay `values` in order
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback: 0.0,
        }
    }

    /// Value returned once the script runs out
    #[must_use]
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.values.pop_front().unwrap_or(self.fallback)
    }
}
