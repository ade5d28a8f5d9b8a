//! Deterministic random number generation for the ride feed.
//!
//! RULE: the simulator never calls a platform RNG.
//! All randomness flows through `StreamRng` instances derived from one
//! master seed, so the same seed always replays the same rides.
//!
//! Each concern (fares, tiers, names, …) gets its own stream, seeded from
//! (master_seed XOR stream_index × golden ratio). Adding a stream never
//! changes the draws of existing ones.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct StreamRng {
    inner: Pcg64Mcg,
}

impl StreamRng {
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). `n` must be > 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        debug_assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n.max(1)
    }

    /// Pick an index using relative weights. Falls back to 0 when
    /// every weight is zero.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0;
        }
        let mut roll = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if roll < *w {
                return i;
            }
            roll -= w;
        }
        weights.len() - 1
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum FeedStream {
    Fare = 0,
    Tier = 1,
    PaymentMethod = 2,
    Names = 3,
    Outcome = 4,
}

impl FeedStream {
    pub fn rng(self, master_seed: u64) -> StreamRng {
        StreamRng::new(master_seed, self as u64)
    }
}
