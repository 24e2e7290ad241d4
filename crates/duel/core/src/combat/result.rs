//! Attack outcome rolls.

use super::hit::check_chance;
use crate::env::{ROLL_COUNTER, ROLL_CRITICAL, ROLL_MISS, RngOracle, compute_seed};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    Miss,
    Hit,
    Critical,
}

impl AttackOutcome {
    pub const fn landed(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

/// Inputs identifying one action's rolls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollSeed {
    pub session_seed: u64,
    pub nonce: u64,
    pub slot: u32,
}

impl RollSeed {
    pub fn roll(&self, rng: &dyn RngOracle, context: u32) -> u32 {
        rng.roll_d100(compute_seed(self.session_seed, self.nonce, self.slot, context))
    }
}

/// Rolls critical first; the miss check only happens for non-critical hits,
/// so the two are mutually exclusive.
pub fn roll_attack(
    seed: RollSeed,
    crit_chance: u32,
    miss_chance: u32,
    rng: &dyn RngOracle,
) -> AttackOutcome {
    if check_chance(crit_chance, seed.roll(rng, ROLL_CRITICAL)) {
        return AttackOutcome::Critical;
    }
    if check_chance(miss_chance, seed.roll(rng, ROLL_MISS)) {
        return AttackOutcome::Miss;
    }
    AttackOutcome::Hit
}

/// Independent counter-attack roll for the defender.
pub fn roll_counter(seed: RollSeed, counter_chance: u32, rng: &dyn RngOracle) -> bool {
    check_chance(counter_chance, seed.roll(rng, ROLL_COUNTER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;

    /// Always rolls the same value.
    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    const SEED: RollSeed = RollSeed {
        session_seed: 1,
        nonce: 0,
        slot: 0,
    };

    #[test]
    fn critical_wins_over_miss() {
        // roll_d100 of 0 is 1: both checks would pass, critical is taken.
        let outcome = roll_attack(SEED, 10, 100, &FixedRng(0));
        assert_eq!(outcome, AttackOutcome::Critical);
    }

    #[test]
    fn miss_checked_only_when_not_critical() {
        let outcome = roll_attack(SEED, 0, 100, &FixedRng(0));
        assert_eq!(outcome, AttackOutcome::Miss);
        let outcome = roll_attack(SEED, 0, 0, &FixedRng(0));
        assert_eq!(outcome, AttackOutcome::Hit);
    }

    #[test]
    fn same_seed_same_outcome() {
        let rng = PcgRng;
        let first: Vec<_> = (0..32)
            .map(|nonce| roll_attack(RollSeed { nonce, ..SEED }, 20, 20, &rng))
            .collect();
        let second: Vec<_> = (0..32)
            .map(|nonce| roll_attack(RollSeed { nonce, ..SEED }, 20, 20, &rng))
            .collect();
        assert_eq!(first, second);
    }
}
