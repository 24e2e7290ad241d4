//! Status effect tracking for combatants.
//!
//! Each combatant carries at most one active instance per
//! [`StatusEffectKind`]. Applying a kind that is already active merges the two
//! according to the kind's [`StackPolicy`].
//!
//! # Turn-based Duration
//!
//! Effects store `remaining_turns`. [`StatusEffects::tick`] runs at the end of
//! the owner's own turn, decrements every effect by exactly one and removes
//! those that reach zero, so a stored effect never has `remaining_turns == 0`.

use arrayvec::ArrayVec;
use strum::EnumCount;

/// Kinds of status effects a combatant can carry.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::EnumCount,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatusEffectKind {
    /// Percent mitigation applied to incoming damage.
    Defense,
    /// Percent reduction of outgoing attack multiplier.
    Curse,
    /// Percent increase of outgoing attack multiplier.
    Divine,
    /// Marks an active class special; percent attack multiplier bonus.
    SpecialActive,
    /// HP restored at the end of each own turn.
    Regeneration,
    /// Percent chance to strike back when hit.
    CounterChance,
    /// The owner keeps the turn once after the current action.
    ExtraTurn,
}

/// How a second application of the same kind merges with the active one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackPolicy {
    /// Magnitudes add up; duration extends to the longer of the two.
    Additive,
    /// Duration resets to the new one; the stronger magnitude stays.
    RefreshDuration,
    /// The new instance replaces the old one outright.
    Replace,
}

impl StatusEffectKind {
    pub const fn stack_policy(self) -> StackPolicy {
        match self {
            Self::Defense => StackPolicy::Additive,
            Self::Curse | Self::Divine => StackPolicy::RefreshDuration,
            Self::SpecialActive | Self::Regeneration | Self::CounterChance | Self::ExtraTurn => {
                StackPolicy::Replace
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A single timed status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    pub magnitude: u32,
    pub remaining_turns: u8,
}

impl StatusEffect {
    pub const fn new(kind: StatusEffectKind, magnitude: u32, remaining_turns: u8) -> Self {
        Self {
            kind,
            magnitude,
            remaining_turns,
        }
    }
}

/// Active status effects on one combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { StatusEffectKind::COUNT }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    /// Applies an effect following the kind's stacking policy.
    ///
    /// Effects with zero duration are ignored. Returns the merged effect.
    pub fn apply(&mut self, effect: StatusEffect) -> Option<StatusEffect> {
        self.apply_capped(effect, None)
    }

    /// Applies an effect and clamps the merged magnitude to `cap`.
    pub fn apply_capped(&mut self, effect: StatusEffect, cap: Option<u32>) -> Option<StatusEffect> {
        if effect.remaining_turns == 0 {
            return None;
        }
        let clamp = |magnitude: u32| cap.map_or(magnitude, |cap| magnitude.min(cap));

        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            match effect.kind.stack_policy() {
                StackPolicy::Additive => {
                    existing.magnitude = existing.magnitude.saturating_add(effect.magnitude);
                    existing.remaining_turns =
                        existing.remaining_turns.max(effect.remaining_turns);
                }
                StackPolicy::RefreshDuration => {
                    existing.magnitude = existing.magnitude.max(effect.magnitude);
                    existing.remaining_turns = effect.remaining_turns;
                }
                StackPolicy::Replace => *existing = effect,
            }
            existing.magnitude = clamp(existing.magnitude);
            return Some(*existing);
        }

        let effect = StatusEffect {
            magnitude: clamp(effect.magnitude),
            ..effect
        };
        // One slot per kind, so capacity is never exceeded.
        self.effects.push(effect);
        Some(effect)
    }

    /// Decrements every effect by one turn and drops the ones that expire.
    ///
    /// Returns the kinds that expired during this tick.
    pub fn tick(&mut self) -> ArrayVec<StatusEffectKind, { StatusEffectKind::COUNT }> {
        let mut expired = ArrayVec::new();
        for effect in self.effects.iter_mut() {
            effect.remaining_turns -= 1;
            if effect.remaining_turns == 0 {
                expired.push(effect.kind);
            }
        }
        self.effects.retain(|e| e.remaining_turns > 0);
        expired
    }

    /// Magnitude of the active effect of `kind`, if any.
    pub fn get(&self, kind: StatusEffectKind) -> Option<u32> {
        self.find(kind).map(|e| e.magnitude)
    }

    pub fn remaining_turns(&self, kind: StatusEffectKind) -> Option<u8> {
        self.find(kind).map(|e| e.remaining_turns)
    }

    pub fn has(&self, kind: StatusEffectKind) -> bool {
        self.find(kind).is_some()
    }

    pub fn remove(&mut self, kind: StatusEffectKind) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.kind == kind)?;
        Some(self.effects.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    fn find(&self, kind: StatusEffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }
}
