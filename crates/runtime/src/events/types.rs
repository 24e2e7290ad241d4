//! Event types for different topics.

use duel_core::{
    AbortReason, ActionOutcome, ActorId, DuelResult, RitualId, RitualResolution, SessionId,
    SettlementRecord,
};
use serde::{Deserialize, Serialize};

/// Lifecycle transitions of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    Proposed {
        session: SessionId,
        challenger: ActorId,
        target: ActorId,
        wager: u64,
    },

    /// Both wagers are escrowed; `narrative` opens the duel.
    Accepted {
        session: SessionId,
        narrative: Vec<String>,
    },

    Expired { session: SessionId },

    Aborted {
        session: SessionId,
        reason: AbortReason,
    },

    Resolved {
        session: SessionId,
        result: DuelResult,
        winner: Option<ActorId>,
    },
}

/// Combat activity inside an active session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombatEvent {
    ActionResolved {
        session: SessionId,
        outcome: ActionOutcome,
    },

    RitualStarted {
        session: SessionId,
        ritual: RitualId,
        initiator: ActorId,
        target: ActorId,
    },

    /// `collected` is the penalty actually moved by the ledger.
    RitualResolved {
        resolution: RitualResolution,
        collected: u64,
    },
}

/// Progress of the payout for a concluded session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SettlementEvent {
    Settled { record: SettlementRecord },

    AttemptFailed {
        session: SessionId,
        attempt: u32,
        error: String,
    },

    /// Inline attempts are exhausted; the supervisor retries later.
    RetryScheduled { session: SessionId, delay_ms: u64 },
}

impl SessionEvent {
    pub fn session(&self) -> SessionId {
        match self {
            Self::Proposed { session, .. }
            | Self::Accepted { session, .. }
            | Self::Expired { session }
            | Self::Aborted { session, .. }
            | Self::Resolved { session, .. } => *session,
        }
    }
}
