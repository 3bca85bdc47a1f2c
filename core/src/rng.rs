//! Deterministic random number generation.
//!
//! RULE: Nothing in the draw engine may call any platform RNG.
//! All randomness flows through DrawRng instances derived from the
//! single master seed held by the session.
//!
//! Each concern gets its own RNG stream, seeded deterministically
//! from (master_seed XOR stream_index). This means:
//!   - Drawing filler or jitter never moves the outcome stream.
//!   - Each stream is fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single concern.
pub struct DrawRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl DrawRng {
    /// Create a stream RNG from the master seed and a stable stream
    /// index. The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float in [0, bound).
    pub fn next_f64_below(&mut self, bound: f64) -> f64 {
        self.next_f64() * bound
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a float in [-bound, bound). Used for the reel stop jitter.
    pub fn jitter(&mut self, bound: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * bound
    }
}

/// All stream RNGs for a single session, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: RngStream) -> DrawRng {
        DrawRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngStream {
    /// Decides the draw outcome.
    Outcome = 0,
    /// Fills the cosmetic tape slots.
    Filler = 1,
    /// Shifts the reel stop point.
    Jitter = 2,
}

impl RngStream {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Outcome => "outcome",
            Self::Filler => "filler",
            Self::Jitter => "jitter",
        }
    }
}
