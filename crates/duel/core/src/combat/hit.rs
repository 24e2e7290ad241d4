//! Critical and miss chance calculations.

use crate::config::DuelConfig;
use crate::env::Terrain;
use crate::state::Combatant;

/// Critical chance for `attacker` on `terrain`, in percent.
///
/// ```text
/// chance = base + class crit + terrain critical
/// clamped to [0, max_crit_chance]
/// ```
pub fn critical_chance(attacker: &Combatant, terrain: &Terrain, config: &DuelConfig) -> u32 {
    let chance = config.base_crit_chance as i64
        + attacker.class.passive.crit_chance as i64
        + terrain.modifiers.critical as i64;
    chance.clamp(0, config.max_crit_chance as i64) as u32
}

/// Miss chance for an attack from `attacker` on `defender`, in percent.
///
/// ```text
/// chance = base + attacker miss + defender evasion + terrain miss + terrain evasion
/// clamped to [0, max_miss_chance]
/// ```
pub fn miss_chance(
    attacker: &Combatant,
    defender: &Combatant,
    terrain: &Terrain,
    config: &DuelConfig,
) -> u32 {
    let chance = config.base_miss_chance as i64
        + attacker.class.passive.miss_chance as i64
        + defender.class.passive.evasion as i64
        + terrain.modifiers.miss as i64
        + terrain.modifiers.evasion as i64;
    chance.clamp(0, config.max_miss_chance as i64) as u32
}

/// `roll` is a d100 result in `1..=100`; a chance of 0 never succeeds.
pub fn check_chance(chance: u32, roll: u32) -> bool {
    roll <= chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Catalog, TerrainModifiers};
    use crate::state::ActorId;

    fn fighter(class: usize) -> Combatant {
        let catalog = Catalog::builtin();
        Combatant::new(
            ActorId::new("f"),
            catalog.classes[class].clone(),
            &DuelConfig::default(),
        )
    }

    #[test]
    fn chances_sum_modifiers_and_clamp() {
        let config = DuelConfig::default();
        let mut terrain = Terrain::neutral("t", "T");
        let warrior = fighter(0);
        assert_eq!(critical_chance(&warrior, &terrain, &config), config.base_crit_chance);
        assert_eq!(
            miss_chance(&warrior, &warrior, &terrain, &config),
            config.base_miss_chance
        );

        terrain.modifiers = TerrainModifiers {
            critical: 500,
            miss: -500,
            ..TerrainModifiers::default()
        };
        assert_eq!(critical_chance(&warrior, &terrain, &config), config.max_crit_chance);
        assert_eq!(miss_chance(&warrior, &warrior, &terrain, &config), 0);
    }

    #[test]
    fn zero_chance_never_passes() {
        assert!(!check_chance(0, 1));
        assert!(check_chance(100, 100));
        assert!(check_chance(15, 15));
        assert!(!check_chance(15, 16));
    }
}
