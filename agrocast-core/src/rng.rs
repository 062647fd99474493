//! Deterministic RNG hierarchy.
//!
//! A master seed generates deterministic sub-seeds for each
//! `(domain, subject, iteration)` tuple. Sub-seeds are derived via BLAKE3
//! hashing, independently of scheduling order, so a batch of forecasts run
//! in parallel draws exactly what it would draw sequentially.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Non-reproducible hierarchy seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a sub-seed for `(domain, subject, iteration)`.
    ///
    /// Each field is length-prefixed so `("price", "ab")` and `("pricea", "b")`
    /// hash differently.
    pub fn sub_seed(&self, domain: &str, subject: &str, iteration: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(&(domain.len() as u64).to_le_bytes());
        hasher.update(domain.as_bytes());
        hasher.update(&(subject.len() as u64).to_le_bytes());
        hasher.update(subject.as_bytes());
        hasher.update(&iteration.to_le_bytes());
        let hash = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    /// Create a seeded StdRng from a sub-seed.
    pub fn rng_for(&self, domain: &str, subject: &str, iteration: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(domain, subject, iteration))
    }
}
