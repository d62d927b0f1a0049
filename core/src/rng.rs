//! Deterministic random number generation.
//!
//! RULE: Nothing in the desk may call any platform RNG for scoring or ids.
//! All randomness flows through StreamRng instances derived from a
//! single master seed handed to the Desk at construction.
//!
//! Each consumer gets its own stream, seeded from
//! (master_seed XOR slot_index * golden ratio). Adding a new stream
//! never changes the numbers an existing stream produces.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A named, deterministic RNG for a single consumer.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [min, max], both ends inclusive.
    /// An inverted range collapses to `min`.
    pub fn next_i32_between(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max as i64 - min as i64 + 1) as u64;
        (min as i64 + self.next_u64_below(span) as i64) as i32
    }

    /// A lowercase base-36 token of `len` characters.
    pub fn base36(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| BASE36[self.next_u64_below(36) as usize] as char)
            .collect()
    }
}

/// All streams for a single desk, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    ScoringNoise = 0,
    CaseIds = 1,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScoringNoise => "scoring_noise",
            Self::CaseIds => "case_ids",
        }
    }
}
