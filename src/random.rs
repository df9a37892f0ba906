//! Thread-safe pseudo-random number generation.
//!
//! Selection may run on many threads at once (parents are drawn while
//! children are generated in parallel), so the generators here keep their
//! state in an [`AtomicU64`] and advance it with a single `fetch_add`.
//! Concurrent draws never race; the interleaving of draws between threads
//! is unspecified.
//!
//! - [`AtomicSplitmix64`]: SplitMix64 (Steele et al., 2014) with atomic state
//! - [`SharedRng`]: borrowed handle implementing [`rand::RngCore`], so every
//!   `rand::Rng` method is available on a shared generator
//! - [`global`]: process-wide generator, reseedable via [`reseed`] for
//!   reproducible runs
//!
//! # Example
//!
//! ```
//! use rand::Rng;
//! use u_moea::random::AtomicSplitmix64;
//!
//! let gen = AtomicSplitmix64::new(42);
//! let idx = gen.handle().random_range(0..10);
//! assert!(idx < 10);
//! ```

use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};

/// Seed of the process-wide generator until [`reseed`] is called.
pub const DEFAULT_SEED: u64 = 0x3da9_9432_ab97_5d26;

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// SplitMix64 generator whose state can be advanced through `&self`.
#[derive(Debug)]
pub struct AtomicSplitmix64 {
    state: AtomicU64,
}

impl AtomicSplitmix64 {
    /// Creates a generator with the given seed.
    pub const fn new(seed: u64) -> Self {
        Self {
            state: AtomicU64::new(seed),
        }
    }

    /// Returns the next 64-bit output.
    pub fn next_u64(&self) -> u64 {
        let mut z = self
            .state
            .fetch_add(GOLDEN_GAMMA, Ordering::Relaxed)
            .wrapping_add(GOLDEN_GAMMA);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Returns an unbiased coin flip (the most significant output bit).
    pub fn next_bool(&self) -> bool {
        self.next_u64() & (1 << 63) != 0
    }

    /// Resets the state to `seed`.
    pub fn reseed(&self, seed: u64) {
        self.state.store(seed, Ordering::Relaxed);
    }

    /// Borrows the generator as a [`rand::RngCore`].
    pub fn handle(&self) -> SharedRng<'_> {
        SharedRng(self)
    }
}

/// A `rand`-compatible view of an [`AtomicSplitmix64`].
///
/// Cheap to create; any number of handles may exist for one generator.
#[derive(Debug, Clone, Copy)]
pub struct SharedRng<'a>(&'a AtomicSplitmix64);

impl RngCore for SharedRng<'_> {
    fn next_u32(&mut self) -> u32 {
        (self.0.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.0.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

static GLOBAL: AtomicSplitmix64 = AtomicSplitmix64::new(DEFAULT_SEED);

/// Returns a handle to the process-wide generator.
pub fn global() -> SharedRng<'static> {
    GLOBAL.handle()
}

/// Reseeds the process-wide generator.
///
/// Intended to be called once at startup, or by tests that need a fixed
/// sequence. Policies with an explicit seed in their config do not draw from
/// the process-wide generator at all.
pub fn reseed(seed: u64) {
    GLOBAL.reseed(seed);
}

/// Draws a fresh seed from the process-wide generator.
pub fn next_seed() -> u64 {
    GLOBAL.next_u64()
}

/// Unbiased coin flip from the process-wide generator.
pub fn random_bool() -> bool {
    GLOBAL.next_bool()
}

/// Uniform index in `0..len` from the process-wide generator.
///
/// # Panics
/// Panics if `len == 0`.
pub fn random_index(len: usize) -> usize {
    use rand::Rng;
    assert!(len > 0, "cannot draw an index from an empty range");
    global().random_range(0..len)
}

/// Picks a uniformly random element of `items`, or `None` if it is empty.
pub fn random_element<T>(items: &[T]) -> Option<&T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[random_index(items.len())])
    }
}
