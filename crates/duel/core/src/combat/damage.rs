//! Damage formulas.

use crate::config::DuelConfig;

/// Everything that shapes one landed hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageInput {
    pub base: u32,
    /// Attack multiplier in percent; 100 is unmodified.
    pub multiplier_pct: u32,
    pub critical: bool,
    /// Defender mitigation in percent, already clamped to the cap.
    pub defense: u32,
    pub ignore_defense: bool,
    /// Terrain fire modifier in percent.
    pub fire_pct: i32,
}

/// Damage of a landed hit.
///
/// ```text
/// raw    = base * multiplier% * (critical ? crit_multiplier : 1)
/// raw    = raw * (100 - defense) / 100         unless defense is ignored
/// raw    = raw * (100 + fire) / 100
/// damage = max(raw, min_damage_floor)
/// ```
///
/// Integer math throughout; every division floors.
pub fn calculate_damage(input: &DamageInput, config: &DuelConfig) -> u32 {
    let crit = if input.critical {
        config.crit_multiplier as u64
    } else {
        1
    };
    let mut damage = input.base as u64 * input.multiplier_pct as u64 * crit / 100;

    if !input.ignore_defense {
        let defense = input.defense.min(100) as u64;
        damage = damage * (100 - defense) / 100;
    }

    let fire = (100 + input.fire_pct as i64).max(0) as u64;
    damage = damage * fire / 100;

    damage.max(config.min_damage_floor as u64).min(u32::MAX as u64) as u32
}

/// Damage reflected by a successful counter: `floor(damage * ratio / 100)`.
pub fn counter_damage(damage: u32, ratio_pct: u32) -> u32 {
    (damage as u64 * ratio_pct as u64 / 100) as u32
}
