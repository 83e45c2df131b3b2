//! Deterministic random engine shared by every mutation strategy.
//!
//! Fuzz findings must be reproducible, so the engine is always seeded: an
//! engine that was never given a seed uses [`DEFAULT_SEED`], never OS
//! entropy.

use rand::distributions::uniform::SampleUniform;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used by engines that were never explicitly seeded.
pub const DEFAULT_SEED: u32 = 5489;

/// Seeded pseudo-random source.
///
/// Implements [`RngCore`], so the [`rand::Rng`] extension methods are
/// available to custom mutation strategies.
#[derive(Debug, Clone)]
pub struct RandomEngine {
    rng: ChaCha8Rng,
}

impl RandomEngine {
    /// Create an engine on the default stream.
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(u64::from(seed)),
        }
    }

    /// Reset the stream.  Identically seeded engines produce identical
    /// sequences.
    pub fn seed(&mut self, value: u32) {
        self.rng = ChaCha8Rng::seed_from_u64(u64::from(value));
    }

    /// Uniform value in `low..=high`.
    ///
    /// Panics if `low > high`.
    pub fn uniform_int<T>(&mut self, low: T, high: T) -> T
    where
        T: SampleUniform + PartialOrd,
    {
        assert!(low <= high, "uniform_int: empty range");
        self.rng.gen_range(low..=high)
    }

    /// Uniform index in `0..len`.
    ///
    /// Panics if `len == 0`.
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "index: empty range");
        self.rng.gen_range(0..len)
    }

    /// `true` with probability `p`; `p` outside `[0, 1]` saturates.
    pub fn bool_with_probability(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.rng.gen_bool(p)
        }
    }

    /// `true` with probability `1 / n` (always for `n <= 1`).
    pub fn one_in(&mut self, n: u64) -> bool {
        n <= 1 || self.rng.gen_range(0..n) == 0
    }

    /// Uniformly chosen element.
    ///
    /// Panics on an empty slice: callers only offer non-empty candidate
    /// sets.
    pub fn pick_one_of<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "pick_one_of: empty candidate set");
        &items[self.rng.gen_range(0..items.len())]
    }

    pub fn random_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut buf = vec![0u8; n];
        self.rng.fill_bytes(&mut buf);
        buf
    }

    /// A seed for a consumer that keeps its own random state.
    pub fn derive_seed(&mut self) -> u32 {
        self.rng.next_u32()
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for RandomEngine {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = RandomEngine::with_seed(7);
        let mut b = RandomEngine::with_seed(7);
        for _ in 0..100 {
            assert_eq!(a.uniform_int(0u64, 1_000_000), b.uniform_int(0u64, 1_000_000));
        }
        assert_eq!(a.random_bytes(33), b.random_bytes(33));
    }

    #[test]
    fn test_reseed_restarts_stream() {
        let mut engine = RandomEngine::new();
        engine.seed(3);
        let first: Vec<u32> = (0..8).map(|_| engine.derive_seed()).collect();
        engine.seed(3);
        let second: Vec<u32> = (0..8).map(|_| engine.derive_seed()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unseeded_engine_is_deterministic() {
        let mut a = RandomEngine::new();
        let mut b = RandomEngine::default();
        assert_eq!(a.next_u64(), b.next_u64());
        let mut c = RandomEngine::with_seed(DEFAULT_SEED);
        let mut d = RandomEngine::new();
        assert_eq!(c.next_u64(), d.next_u64());
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = RandomEngine::with_seed(1);
        let mut b = RandomEngine::with_seed(2);
        assert_ne!(a.random_bytes(16), b.random_bytes(16));
    }

    #[test]
    fn test_uniform_int_inclusive_bounds() {
        let mut engine = RandomEngine::with_seed(11);
        let mut seen_low = false;
        let mut seen_high = false;
        for _ in 0..1000 {
            let v = engine.uniform_int(-2i32, 2);
            assert!((-2..=2).contains(&v));
            seen_low |= v == -2;
            seen_high |= v == 2;
        }
        assert!(seen_low && seen_high);
        assert_eq!(engine.uniform_int(5u8, 5), 5);
    }

    #[test]
    fn test_bool_with_probability_edges() {
        let mut engine = RandomEngine::with_seed(0);
        for _ in 0..100 {
            assert!(!engine.bool_with_probability(0.0));
            assert!(engine.bool_with_probability(1.0));
            assert!(!engine.bool_with_probability(f64::NAN));
            assert!(engine.bool_with_probability(2.0));
        }
    }

    #[test]
    fn test_one_in() {
        let mut engine = RandomEngine::with_seed(0);
        assert!(engine.one_in(0));
        assert!(engine.one_in(1));
        let hits = (0..10_000).filter(|_| engine.one_in(100)).count();
        assert!(hits > 30 && hits < 250, "hits = {}", hits);
    }

    #[test]
    fn test_pick_one_of_covers_all() {
        let mut engine = RandomEngine::with_seed(5);
        let items = ["a", "b", "c"];
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(*engine.pick_one_of(&items));
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    #[should_panic(expected = "empty candidate set")]
    fn test_pick_one_of_empty_panics() {
        let mut engine = RandomEngine::new();
        let empty: [u8; 0] = [];
        engine.pick_one_of(&empty);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut engine = RandomEngine::with_seed(9);
        let mut items: Vec<u32> = (0..50).collect();
        engine.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }
}
