//! Deterministic RNG helpers.
//!
//! Small and dependency-free; **not** cryptographic. Random composites draw from a per-tree
//! [`SplitMix64`] so that a tree instance replays identically for the same seed.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    /// Uniform value in `0..bound`, without modulo bias. Returns 0 for `bound == 0`.
    fn next_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let x = self.next_u64();
            if x < zone {
                return x % bound;
            }
        }
    }

    /// Uniform index in `low..=high`. Returns `low` when the range is empty.
    fn next_index_in(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        low + self.next_below((high - low) as u64 + 1) as usize
    }
}

/// SplitMix64: good seeding RNG and small deterministic generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        mix64(self.state)
    }
}

pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Seed for the `instance`-th tree created from a base seed.
pub fn derive_seed(base_seed: u64, instance: u64, stream: u64) -> u64 {
    let x = base_seed ^ mix64(instance.wrapping_add(0x9E3779B97F4A7C15)) ^ mix64(stream);
    mix64(x)
}
