//! Session state owned by the state machine.
//!
//! Everything here is plain data plus small invariant-preserving helpers.
//! Transitions live in [`crate::engine`].
mod combatant;
mod common;
mod ritual;
mod session;
mod settlement;
mod status;

pub use combatant::{Combatant, Cooldowns};
pub use common::{ActorId, CombatantSlot, HitPoints, HoldId, SessionId, Timestamp};
pub use ritual::{PendingRitual, RitualId, RitualResolution, RitualStatus, RitualVerdict};
pub use session::{AbortReason, DuelResult, DuelSession, Escrow, SessionState};
pub use settlement::{HoldInstruction, SettlementOutcome, SettlementPlan, SettlementRecord};
pub use status::{StackPolicy, StatusEffect, StatusEffectKind, StatusEffects};
