use core::fmt;

use crate::state::{Combatant, StatusEffect, StatusEffectKind};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct AbilityId(String);

impl AbilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Always-on class modifiers, in percentage points unless noted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PassiveModifier {
    pub crit_chance: i32,
    /// Added to the miss chance of this class's own attacks.
    pub miss_chance: i32,
    /// Added to the miss chance of attacks against this class.
    pub evasion: i32,
    pub damage_pct: i32,
    pub defense: i32,
    /// Flat HP restored at the end of each own turn.
    pub regeneration: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusGrant {
    pub kind: StatusEffectKind,
    pub magnitude: u32,
    pub turns: u8,
}

/// What a class special does to its user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpecialEffect {
    pub grants: Vec<StatusGrant>,
    pub heal: u32,
}

impl SpecialEffect {
    /// Applies the status grants to `user`. Defense grants respect `defense_cap`.
    ///
    /// Does not heal. The resolver heals when the special resolves and grants
    /// statuses after the user's end-of-turn tick.
    pub fn grant_statuses(&self, user: &mut Combatant, defense_cap: u32) {
        for grant in &self.grants {
            let effect = StatusEffect::new(grant.kind, grant.magnitude, grant.turns);
            let cap = (grant.kind == StatusEffectKind::Defense).then_some(defense_cap);
            user.status_effects.apply_capped(effect, cap);
        }
    }

    /// Whether the special hands its user another action.
    pub fn grants_extra_turn(&self) -> bool {
        self.grants
            .iter()
            .any(|grant| grant.kind == StatusEffectKind::ExtraTurn)
    }

    /// Copy without the `ExtraTurn` grant, which the resolver consumes directly.
    pub fn without_extra_turn(&self) -> Self {
        Self {
            grants: self
                .grants
                .iter()
                .filter(|grant| grant.kind != StatusEffectKind::ExtraTurn)
                .cloned()
                .collect(),
            heal: self.heal,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecialAbility {
    pub id: AbilityId,
    pub name: String,
    /// Turns before the ability can be used again.
    pub cooldown: u8,
    pub effect: SpecialEffect,
}

/// Immutable class definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterClass {
    pub id: ClassId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub passive: PassiveModifier,
    pub special: SpecialAbility,
}
