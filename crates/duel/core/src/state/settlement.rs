//! Settlement planning.
//!
//! A [`SettlementPlan`] is derived purely from a terminal session: which
//! escrow holds to commit, which to release, and the record to store once
//! the ledger has carried the instructions out.

use super::{ActorId, DuelResult, DuelSession, HoldId, SessionId, SessionState, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SettlementOutcome {
    /// Both wagers went to the winner.
    Victory,
    /// Both wagers returned to their owners.
    Refund,
}

/// Immutable record of a concluded session. Keyed by `session_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettlementRecord {
    pub session_id: SessionId,
    pub outcome: SettlementOutcome,
    pub winner: Option<ActorId>,
    pub loser: Option<ActorId>,
    pub payout: u64,
    pub refunded: u64,
    pub settled_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HoldInstruction {
    Commit { hold: HoldId, destination: ActorId },
    Release { hold: HoldId },
}

impl HoldInstruction {
    pub fn hold(&self) -> HoldId {
        match self {
            Self::Commit { hold, .. } | Self::Release { hold } => *hold,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementPlan {
    pub session_id: SessionId,
    pub outcome: SettlementOutcome,
    pub winner: Option<ActorId>,
    pub loser: Option<ActorId>,
    pub payout: u64,
    pub refunded: u64,
    pub instructions: Vec<HoldInstruction>,
}

impl SettlementPlan {
    /// Builds the plan for a resolved or aborted session.
    ///
    /// Returns `None` for sessions that owe nothing: non-terminal ones and
    /// expired proposals, which never escrowed.
    pub fn for_session(session: &DuelSession) -> Option<Self> {
        let victory = match (session.state, session.result) {
            (SessionState::Resolved, Some(DuelResult::Victory { winner })) => Some(winner),
            (SessionState::Resolved, _) | (SessionState::Aborted, _) => None,
            _ => return None,
        };

        let mut plan = Self {
            session_id: session.id,
            outcome: SettlementOutcome::Refund,
            winner: None,
            loser: None,
            payout: 0,
            refunded: 0,
            instructions: Vec::new(),
        };

        let Some(escrow) = session.escrow else {
            return Some(plan);
        };

        match victory {
            Some(winner) => {
                let destination = session.combatant(winner).identity.clone();
                plan.outcome = SettlementOutcome::Victory;
                plan.loser = Some(session.combatant(winner.opponent()).identity.clone());
                plan.payout = escrow.total();
                plan.instructions = vec![
                    HoldInstruction::Commit {
                        hold: escrow.challenger_hold,
                        destination: destination.clone(),
                    },
                    HoldInstruction::Commit {
                        hold: escrow.target_hold,
                        destination: destination.clone(),
                    },
                ];
                plan.winner = Some(destination);
            }
            None => {
                plan.refunded = escrow.total();
                plan.instructions = vec![
                    HoldInstruction::Release {
                        hold: escrow.challenger_hold,
                    },
                    HoldInstruction::Release {
                        hold: escrow.target_hold,
                    },
                ];
            }
        }
        Some(plan)
    }

    pub fn into_record(self, settled_at: Timestamp) -> SettlementRecord {
        SettlementRecord {
            session_id: self.session_id,
            outcome: self.outcome,
            winner: self.winner,
            loser: self.loser,
            payout: self.payout,
            refunded: self.refunded,
            settled_at,
        }
    }
}
