use core::fmt;

use super::{
    ActorId, Combatant, CombatantSlot, HoldId, PendingRitual, RitualId, SessionId, Timestamp,
};
use crate::env::Terrain;

/// Lifecycle state of a duel session.
///
/// Accepting a proposal moves the session straight to `InProgress`, so the
/// accepted step is never observable as a stored state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Proposed,
    InProgress,
    Resolved,
    Aborted,
    Expired,
}

impl SessionState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Aborted | Self::Expired)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger holds taken for both wagers at accept time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Escrow {
    pub challenger_hold: HoldId,
    pub target_hold: HoldId,
    pub amount_each: u64,
}

impl Escrow {
    pub const fn total(&self) -> u64 {
        self.amount_each * 2
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuelResult {
    Victory { winner: CombatantSlot },
    /// Both combatants dropped to zero from the same action.
    MutualLoss,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AbortReason {
    /// The turn owner did not act before the turn timeout.
    TurnTimeout,
    /// An operator or the supervisor cancelled the session.
    Cancelled,
}

/// One duel between two actors, from proposal to settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DuelSession {
    pub id: SessionId,
    pub challenger: Combatant,
    pub target: Combatant,
    pub wager: u64,
    pub terrain: Terrain,
    pub state: SessionState,
    pub turn_owner: CombatantSlot,
    pub turn_index: u32,
    pub created_at: Timestamp,
    pub last_action_at: Timestamp,
    /// Base seed for every roll in this session.
    pub seed: u64,
    pub escrow: Option<Escrow>,
    pub result: Option<DuelResult>,
    pub abort_reason: Option<AbortReason>,
    pub rituals: Vec<PendingRitual>,
    pub special_event_fired: bool,
    pub next_ritual_id: u32,
    pub settled_at: Option<Timestamp>,
}

impl DuelSession {
    pub fn combatant(&self, slot: CombatantSlot) -> &Combatant {
        match slot {
            CombatantSlot::Challenger => &self.challenger,
            CombatantSlot::Target => &self.target,
        }
    }

    pub fn combatant_mut(&mut self, slot: CombatantSlot) -> &mut Combatant {
        match slot {
            CombatantSlot::Challenger => &mut self.challenger,
            CombatantSlot::Target => &mut self.target,
        }
    }

    /// Returns `(actor, opponent)` as disjoint mutable borrows.
    pub fn pair_mut(&mut self, actor: CombatantSlot) -> (&mut Combatant, &mut Combatant) {
        match actor {
            CombatantSlot::Challenger => (&mut self.challenger, &mut self.target),
            CombatantSlot::Target => (&mut self.target, &mut self.challenger),
        }
    }

    pub fn slot_of(&self, actor: &ActorId) -> Option<CombatantSlot> {
        if &self.challenger.identity == actor {
            Some(CombatantSlot::Challenger)
        } else if &self.target.identity == actor {
            Some(CombatantSlot::Target)
        } else {
            None
        }
    }

    pub fn turn_owner_id(&self) -> &ActorId {
        &self.combatant(self.turn_owner).identity
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Resolved and aborted sessions owe a settlement until one is recorded.
    pub fn needs_settlement(&self) -> bool {
        matches!(self.state, SessionState::Resolved | SessionState::Aborted)
            && self.settled_at.is_none()
    }

    pub fn winner(&self) -> Option<&ActorId> {
        match self.result? {
            DuelResult::Victory { winner } => Some(&self.combatant(winner).identity),
            DuelResult::MutualLoss => None,
        }
    }

    pub fn ritual(&self, id: RitualId) -> Option<&PendingRitual> {
        self.rituals.iter().find(|r| r.id == id)
    }

    pub fn ritual_mut(&mut self, id: RitualId) -> Option<&mut PendingRitual> {
        self.rituals.iter_mut().find(|r| r.id == id)
    }

    pub fn pending_rituals(&self) -> impl Iterator<Item = &PendingRitual> {
        self.rituals.iter().filter(|r| r.is_pending())
    }

    /// Wager amount currently held in escrow for this session.
    pub fn escrowed(&self) -> u64 {
        match (&self.escrow, self.settled_at) {
            (Some(escrow), None) => escrow.total(),
            _ => 0,
        }
    }
}
