//! Duel actions and their resolved outcomes.
mod outcome;

pub use outcome::{ActionOutcome, HpChange, OutcomeFlags};

use crate::state::ActorId;

/// An action the turn owner may submit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuelAction {
    BasicAttack,
    /// Spends `cost` resources for a larger attack multiplier.
    BoostedAttack { cost: u32 },
    /// Raises the actor's own `Defense`; no damage roll.
    Defend,
    /// Uses the actor's class ability.
    ClassSpecial,
    /// Starts a side ritual addressed at a third party.
    SideRitual { target: ActorId, cost: u32 },
    /// Ignores defense and deals the same damage to the actor.
    HighRiskStrike,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    BasicAttack,
    BoostedAttack,
    Defend,
    ClassSpecial,
    SideRitual,
    HighRiskStrike,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl DuelAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::BasicAttack => ActionKind::BasicAttack,
            Self::BoostedAttack { .. } => ActionKind::BoostedAttack,
            Self::Defend => ActionKind::Defend,
            Self::ClassSpecial => ActionKind::ClassSpecial,
            Self::SideRitual { .. } => ActionKind::SideRitual,
            Self::HighRiskStrike => ActionKind::HighRiskStrike,
        }
    }

    /// Resource cost declared by the action payload.
    pub fn resource_cost(&self) -> u32 {
        match self {
            Self::BoostedAttack { cost } | Self::SideRitual { cost, .. } => *cost,
            _ => 0,
        }
    }

    /// Whether the action makes an attack roll against the opponent.
    pub fn is_attack(&self) -> bool {
        matches!(
            self,
            Self::BasicAttack | Self::BoostedAttack { .. } | Self::HighRiskStrike
        )
    }
}
