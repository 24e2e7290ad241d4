use duel_core::{ActorId, HoldId};
use thiserror::Error;

/// Failures reported by a [`BalanceLedger`](super::BalanceLedger).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("actor {actor} needs {required} but only has {available} available")]
    InsufficientFunds {
        actor: ActorId,
        required: u64,
        available: u64,
    },

    #[error("unknown {0}")]
    UnknownHold(HoldId),

    /// The hold was already finalized the other way (released vs committed,
    /// or committed to a different destination).
    #[error("{hold} is already {state}")]
    HoldFinalized { hold: HoldId, state: &'static str },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
