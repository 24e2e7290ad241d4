//! Deterministic random rolls.
//!
//! Every roll is a pure function of a seed. The seed is mixed from the
//! session seed, the turn index, the acting slot and a roll context, so a
//! session replays identically given the same base seed.

use sha2::{Digest, Sha256};

use crate::state::SessionId;

/// Roll context for the critical-hit check.
pub const ROLL_CRITICAL: u32 = 0;
/// Roll context for the miss check. Only rolled when the hit is not critical.
pub const ROLL_MISS: u32 = 1;
/// Roll context for the defender's counter-attack check.
pub const ROLL_COUNTER: u32 = 2;
/// Roll context for terrain special events with a chance trigger.
pub const ROLL_TERRAIN_EVENT: u32 = 3;

/// Source of deterministic randomness.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }
}

/// PCG-XSH-RR: 32-bit output from a single 64-bit LCG step.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Mixes the roll inputs into one seed.
///
/// `context` separates independent rolls made while resolving the same
/// action (see the `ROLL_*` constants).
pub fn compute_seed(session_seed: u64, nonce: u64, slot: u32, context: u32) -> u64 {
    let mut hash = session_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (slot as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Derives the base seed of a session from its id and caller entropy.
pub fn derive_session_seed(session: SessionId, entropy: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(b"duel-session-seed");
    hasher.update(session.0.to_le_bytes());
    hasher.update(entropy.to_le_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
