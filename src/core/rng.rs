//! Deterministic random number generation.
//!
//! Every random decision in a match (dealt phases, the weak opponent's coin
//! flip, randomly targeted wildcards, unlock picks) draws from a `GameRng`
//! so a seeded match replays identically.
//!
//! ```
//! use lunar_match::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let mut search_rng = rng.fork();
//!
//! // Forks are deterministic: the same parent seed and fork count
//! // produce the same branch.
//! let mut again = GameRng::new(42).fork();
//! assert_eq!(search_rng.gen_range_usize(0..100), again.gen_range_usize(0..100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hash::{Hash, Hasher};

use super::phase::{Phase, PHASE_COUNT};

/// Deterministic RNG with forking.
///
/// Uses ChaCha8 for speed while keeping good statistical quality.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Seed this RNG was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fork this RNG to create an independent branch.
    ///
    /// Each fork produces a different but deterministic sequence. Used to
    /// hand an opponent search its own stream without advancing ours.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self.seed.wrapping_add(self.fork_counter.wrapping_mul(0x9E3779B97F4A7C15));
        Self {
            inner: ChaCha8Rng::seed_from_u64(fork_seed),
            seed: fork_seed,
            fork_counter: 0,
        }
    }

    /// Create an independent stream for a specific context.
    ///
    /// The same context always produces the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        let context_seed = hasher.finish();

        Self {
            inner: ChaCha8Rng::seed_from_u64(context_seed),
            seed: context_seed,
            fork_counter: 0,
        }
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Generate a random boolean with given probability of true.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability)
    }

    /// Flip a fair coin.
    pub fn coin(&mut self) -> bool {
        self.gen_bool(0.5)
    }

    /// Draw a uniformly random phase.
    pub fn phase(&mut self) -> Phase {
        Phase::new(self.inner.gen_range(0..PHASE_COUNT))
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Choose up to `amount` distinct elements, in random order.
    pub fn choose_many<T: Clone>(&mut self, slice: &[T], amount: usize) -> Vec<T> {
        use rand::seq::SliceRandom;
        slice.choose_multiple(&mut self.inner, amount).cloned().collect()
    }
}
