//! Unified error types surfaced by the runtime API.
//!
//! Wraps duel rule rejections, ledger and repository failures, and worker
//! coordination problems so adapters can classify them in one place.
use duel_core::{ActorId, ClassifiedError, DuelError, ErrorCategory, ErrorSeverity, SessionId};
use thiserror::Error;

use crate::ledger::LedgerError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Duel(#[from] DuelError),

    #[error("{0} not found")]
    SessionNotFound(SessionId),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("no action provider configured for {actor}")]
    ProviderNotSet { actor: ActorId },

    #[error("action provider for {actor} failed: {reason}")]
    Provider { actor: ActorId, reason: String },

    #[error("runtime requires a balance ledger before building")]
    MissingLedger,

    #[error("timeout worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl RuntimeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Duel(err) => err.category(),
            Self::SessionNotFound(_) => ErrorCategory::Lifecycle,
            Self::Ledger(LedgerError::InsufficientFunds { .. }) => ErrorCategory::Resource,
            Self::Ledger(_) | Self::Repository(_) => ErrorCategory::Settlement,
            Self::ProviderNotSet { .. } | Self::Provider { .. } => ErrorCategory::Validation,
            Self::MissingLedger | Self::WorkerJoin(_) => ErrorCategory::Lifecycle,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Duel(err) => err.severity(),
            Self::Ledger(_) | Self::Repository(_) | Self::Provider { .. } => {
                ErrorSeverity::Internal
            }
            Self::MissingLedger | Self::WorkerJoin(_) => ErrorSeverity::Fatal,
            Self::SessionNotFound(_) | Self::ProviderNotSet { .. } => ErrorSeverity::Validation,
        }
    }

    /// Only a busy session is worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Concurrency
    }

    /// The duel rejection, if this is one.
    pub fn as_duel(&self) -> Option<&DuelError> {
        match self {
            Self::Duel(err) => Some(err),
            _ => None,
        }
    }
}
