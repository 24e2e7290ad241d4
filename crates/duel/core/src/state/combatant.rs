use std::collections::BTreeMap;

use super::{ActorId, HitPoints, StatusEffectKind, StatusEffects};
use crate::config::DuelConfig;
use crate::env::{AbilityId, CharacterClass, Terrain};

/// Remaining cooldown turns per ability. Abilities at zero are not stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Cooldowns(BTreeMap<AbilityId, u8>);

impl Cooldowns {
    pub fn remaining(&self, ability: &AbilityId) -> u8 {
        self.0.get(ability).copied().unwrap_or(0)
    }

    pub fn is_ready(&self, ability: &AbilityId) -> bool {
        self.remaining(ability) == 0
    }

    pub fn start(&mut self, ability: AbilityId, turns: u8) {
        if turns == 0 {
            self.0.remove(&ability);
        } else {
            self.0.insert(ability, turns);
        }
    }

    /// Decrements every cooldown by one turn, dropping the finished ones.
    pub fn tick(&mut self) {
        self.0.retain(|_, turns| {
            *turns -= 1;
            *turns > 0
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AbilityId, u8)> {
        self.0.iter().map(|(id, turns)| (id, *turns))
    }
}

/// One actor's fighting state inside a single session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub identity: ActorId,
    pub hit_points: HitPoints,
    pub class: CharacterClass,
    pub status_effects: StatusEffects,
    /// In-session currency spent on boosted actions and rituals.
    pub resources: u32,
    pub cooldowns: Cooldowns,
}

impl Combatant {
    pub fn new(identity: ActorId, class: CharacterClass, config: &DuelConfig) -> Self {
        Self {
            identity,
            hit_points: HitPoints::full(config.max_hp),
            class,
            status_effects: StatusEffects::empty(),
            resources: config.starting_resources,
            cooldowns: Cooldowns::default(),
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.hit_points.is_depleted()
    }

    /// Total damage mitigation in percent, clamped to `[0, cap]`.
    pub fn defense(&self, terrain: &Terrain, cap: u32) -> u32 {
        let status = self
            .status_effects
            .get(StatusEffectKind::Defense)
            .unwrap_or(0) as i64;
        let total = status + self.class.passive.defense as i64 + terrain.modifiers.defense as i64;
        total.clamp(0, cap as i64) as u32
    }

    /// Net attack multiplier adjustment from statuses and passives, in percent.
    pub fn attack_bonus_pct(&self) -> i64 {
        let effects = &self.status_effects;
        let gain = effects.get(StatusEffectKind::Divine).unwrap_or(0) as i64
            + effects.get(StatusEffectKind::SpecialActive).unwrap_or(0) as i64;
        let loss = effects.get(StatusEffectKind::Curse).unwrap_or(0) as i64;
        self.class.passive.damage_pct as i64 + gain - loss
    }

    /// Deducts `cost` resources or reports how many were available.
    pub fn spend(&mut self, cost: u32) -> Result<(), u32> {
        if self.resources < cost {
            return Err(self.resources);
        }
        self.resources -= cost;
        Ok(())
    }
}
