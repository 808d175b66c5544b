//! Random sources for ambient events.
//!
//! [`RandomSource`] is the seam every stochastic policy draws from, so tests
//! can script exact draws. [`Xorshift64`] is the production source: seedable,
//! fast, and identical across platforms (pure integer arithmetic).

use serde::{Deserialize, Serialize};

/// A source of uniform draws in [0, 1).
///
/// Only [`next_f64`](RandomSource::next_f64) is required; range and index
/// helpers are derived from it so scripted sources stay trivial.
pub trait RandomSource {
    /// Returns a uniformly distributed value in [0, 1).
    fn next_f64(&mut self) -> f64;

    /// Returns a uniformly distributed value in [min, max).
    ///
    /// Returns `min` when `max <= min`.
    fn next_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + self.next_f64() * (max - min)
    }

    /// Returns a uniformly distributed index in [0, len).
    ///
    /// Returns 0 for `len == 0` so callers on a degenerate grid never panic.
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses shifts (13, 7, 17). A seed of 0 is replaced with a non-zero fallback
/// to avoid the all-zeros fixed point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed (0 is replaced by a fallback).
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Derives an independent generator for a child (one per surface).
    ///
    /// The child seed is drawn from this generator and mixed with `salt` so
    /// children created in sequence never share a stream.
    pub fn fork(&mut self, salt: u64) -> Self {
        let mixed = self.next_u64() ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self::new(mixed)
    }
}

impl RandomSource for Xorshift64 {
    /// Upper 53 bits of `next_u64()` divided by 2^53.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}
