//! Randomness behind a seam so runs can be replayed.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Source of the uniform draws the simulation consumes.
pub trait RandomSource {
    /// A value in `[0, 1)`.
    fn uniform01(&mut self) -> f64;

    /// A value in `[0, bound)`. `bound` must be non-zero.
    fn index(&mut self, bound: usize) -> usize {
        let scaled = (self.uniform01() * bound as f64) as usize;
        scaled.min(bound - 1)
    }
}

impl<R: RngCore> RandomSource for R {
    fn uniform01(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn index(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }
}

/// Create a deterministic RNG from a seed.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Create an RNG seeded from the OS.
pub fn from_entropy() -> StdRng {
    StdRng::from_entropy()
}

/// Replays a fixed sequence of draws, then repeats a fallback value.
///
/// Intended for tests that need to force specific spawn and mutation
/// decisions.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        ScriptedRandom {
            draws: draws.into_iter().collect(),
            fallback,
        }
    }

    /// Every draw returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new([], value)
    }

    /// Draws still queued before the fallback kicks in.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform01(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}
