//! Injectable randomness.
//!
//! Every randomized decision in the engine (distractor offsets, pool sampling,
//! choice shuffling, generated problems) goes through [`RandomSource`], so tests
//! can swap in a seeded [`StdRandom`] or a fully scripted [`ScriptedRandom`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// Uniform integer in `0..upper`. `upper == 0` yields `0`.
    fn below(&mut self, upper: u64) -> u64;

    fn coin(&mut self) -> bool {
        self.below(2) == 1
    }

    /// Uniform index into a slice of length `len`.
    #[allow(clippy::cast_possible_truncation)]
    fn index(&mut self, len: usize) -> usize {
        self.below(len as u64) as usize
    }
}

/// In-place Fisher–Yates shuffle.
pub fn shuffle<T, R: RandomSource + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

/// `rand`-backed source used outside of tests.
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Seeds from the thread-local OS-seeded generator.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn below(&mut self, upper: u64) -> u64 {
        if upper == 0 {
            return 0;
        }
        self.rng.random_range(0..upper)
    }
}

/// Replays a fixed sequence of raw values, reduced modulo `upper`.
///
/// The sequence cycles once exhausted; an empty script always yields `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: Vec<u64>,
    cursor: usize,
}

impl ScriptedRandom {
    #[must_use]
    pub fn new(values: impl Into<Vec<u64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// A source that answers `0` to every draw.
    #[must_use]
    pub fn zeros() -> Self {
        Self::default()
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, upper: u64) -> u64 {
        if upper == 0 || self.values.is_empty() {
            return 0;
        }
        let raw = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        raw % upper
    }
}
