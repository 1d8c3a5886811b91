//! Random stream setup for the generation phases.
//!
//! Every branch task and colored pass draws from its own [`SmallRng`]. With a
//! base seed the streams are derived deterministically from it; without one
//! each stream is seeded from OS entropy.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::graph::VertexId;

/// SplitMix64 increment (the 64-bit golden ratio) used for stream seed
/// derivation.
const STREAM_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

#[inline]
pub(crate) fn mix_stream_seed(base_seed: u64, stream: usize) -> u64 {
    splitmix64(base_seed ^ ((stream as u64).wrapping_add(1).wrapping_mul(STREAM_SEED_SPACING)))
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(STREAM_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

/// Hands out independent random streams to concurrent tasks.
#[derive(Debug)]
pub(super) struct RngFactory {
    base_seed: Option<u64>,
    next_stream: AtomicUsize,
}

impl RngFactory {
    pub(super) fn new(base_seed: Option<u64>) -> Self {
        Self {
            base_seed,
            next_stream: AtomicUsize::new(0),
        }
    }

    pub(super) fn stream(&self) -> SmallRng {
        match self.base_seed {
            Some(seed) => {
                let stream = self.next_stream.fetch_add(1, Ordering::Relaxed);
                SmallRng::seed_from_u64(mix_stream_seed(seed, stream))
            }
            None => SmallRng::from_entropy(),
        }
    }
}

/// Draws a Bernoulli trial. Probabilities outside `[0, 1]` are clamped.
pub(super) fn check_probability(rng: &mut SmallRng, probability: f64) -> bool {
    rng.gen_bool(probability.clamp(0.0, 1.0))
}

/// Picks a uniformly random element of `candidates`.
pub(super) fn pick_vertex(rng: &mut SmallRng, candidates: &[VertexId]) -> Option<VertexId> {
    if candidates.is_empty() {
        return None;
    }
    candidates.get(rng.gen_range(0..candidates.len())).copied()
}
