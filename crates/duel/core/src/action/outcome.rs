use bitflags::bitflags;

use super::DuelAction;
use crate::state::{ActorId, RitualId};

bitflags! {
    /// Notable things that happened while resolving one action.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct OutcomeFlags: u16 {
        const CRITICAL = 1 << 0;
        const MISS = 1 << 1;
        const COUNTERED = 1 << 2;
        const EXTRA_TURN = 1 << 3;
        const SPECIAL_EVENT = 1 << 4;
        const RITUAL_PENDING = 1 << 5;
        const DEFENDED = 1 << 6;
        const SPECIAL_USED = 1 << 7;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HpChange {
    pub before: u32,
    pub after: u32,
}

impl HpChange {
    pub fn delta(&self) -> i64 {
        self.after as i64 - self.before as i64
    }
}

/// Value object describing one resolved action, for presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    pub turn_index: u32,
    pub actor: ActorId,
    pub action: DuelAction,
    pub damage_dealt: u32,
    pub self_damage: u32,
    pub counter_damage: u32,
    pub healed: u32,
    pub resources_spent: u32,
    pub flags: OutcomeFlags,
    pub actor_hp: HpChange,
    pub opponent_hp: HpChange,
    pub ritual: Option<RitualId>,
    pub narrative: Vec<String>,
}

impl ActionOutcome {
    pub fn is_critical(&self) -> bool {
        self.flags.contains(OutcomeFlags::CRITICAL)
    }

    pub fn is_miss(&self) -> bool {
        self.flags.contains(OutcomeFlags::MISS)
    }

    pub fn grants_extra_turn(&self) -> bool {
        self.flags.contains(OutcomeFlags::EXTRA_TURN)
    }
}
