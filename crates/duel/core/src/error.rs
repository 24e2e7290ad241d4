//! Error taxonomy for duel operations.
//!
//! Every rejected operation surfaces a [`DuelError`]. Rejections never change
//! session state; the category tells adapters whether a retry makes sense.
//!
//! # Design Principles
//!
//! - **One enum per concern**: payload problems live in [`ValidationError`],
//!   everything else is a [`DuelError`] variant
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **Stable codes**: [`ClassifiedError::error_code`] is safe to match on
//!   in adapters and metrics

use crate::env::{AbilityId, ClassId, TerrainId};
use crate::state::{ActorId, RitualId, SessionId, SessionState};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: retrying unchanged may succeed
/// - **Validation**: invalid input, do not retry without changes
/// - **Internal**: a collaborator misbehaved and needs investigation
/// - **Fatal**: unrecoverable, session state cannot be trusted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Error families exposed to adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad wager or action payload.
    Validation,
    /// Wrong actor for the operation.
    Authorization,
    /// Another operation holds the session; caller may retry.
    Concurrency,
    /// Funds, resources or cooldowns do not allow the operation.
    Resource,
    /// The session is not in a state that accepts the operation.
    Lifecycle,
    /// The ledger refused a settlement step.
    Settlement,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Uniform classification interface for duel errors.
pub trait ClassifiedError: core::fmt::Display + core::fmt::Debug {
    fn category(&self) -> ErrorCategory;

    fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Concurrency => ErrorSeverity::Recoverable,
            ErrorCategory::Settlement => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    /// Static identifier for the error variant.
    fn error_code(&self) -> &'static str;
}

/// Invalid proposal or action payload.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    #[error("wager {wager} is below the minimum of {minimum}")]
    WagerBelowMinimum { wager: u64, minimum: u64 },

    #[error("an actor cannot challenge themselves")]
    SelfChallenge,

    #[error("unknown terrain `{0}`")]
    UnknownTerrain(TerrainId),

    #[error("unknown character class `{0}`")]
    UnknownClass(ClassId),

    #[error("boost cost {cost} must be between 1 and {max}")]
    InvalidBoostCost { cost: u32, max: u32 },

    #[error("ritual cost {cost} is below the minimum of {minimum}")]
    RitualCostTooLow { cost: u32, minimum: u32 },

    #[error("ritual target {0} is a combatant in this duel")]
    RitualTargetIsCombatant(ActorId),

    #[error("a ritual started by this combatant is still pending")]
    RitualAlreadyPending,

    #[error("unknown ritual {0}")]
    UnknownRitual(RitualId),

    #[error("actor {actor} is already engaged in {session}")]
    ActorAlreadyEngaged { actor: ActorId, session: SessionId },
}

/// Errors surfaced by session operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("actor {actor} is not authorized for this operation")]
    NotAuthorized { actor: ActorId },

    #[error("it is {turn_owner}'s turn, not {actor}'s")]
    NotYourTurn { actor: ActorId, turn_owner: ActorId },

    #[error("{session} is busy with another operation")]
    SessionBusy { session: SessionId },

    #[error("actor {actor} needs {required} but only has {available} available")]
    InsufficientFunds {
        actor: ActorId,
        required: u64,
        available: u64,
    },

    #[error("action needs {required} resources but only {available} are available")]
    InsufficientResources { required: u32, available: u32 },

    #[error("ability `{ability}` is on cooldown for {remaining} more turns")]
    AbilityOnCooldown { ability: AbilityId, remaining: u8 },

    #[error("session is {state}, not in progress")]
    SessionNotActive { state: SessionState },

    #[error("{session} has expired")]
    AlreadyExpired { session: SessionId },

    #[error("settlement of {session} failed: {reason}")]
    SettlementFailed { session: SessionId, reason: String },
}

impl ClassifiedError for DuelError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::NotAuthorized { .. } | Self::NotYourTurn { .. } => ErrorCategory::Authorization,
            Self::SessionBusy { .. } => ErrorCategory::Concurrency,
            Self::InsufficientFunds { .. }
            | Self::InsufficientResources { .. }
            | Self::AbilityOnCooldown { .. } => ErrorCategory::Resource,
            Self::SessionNotActive { .. } | Self::AlreadyExpired { .. } => {
                ErrorCategory::Lifecycle
            }
            Self::SettlementFailed { .. } => ErrorCategory::Settlement,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotAuthorized { .. } => "not_authorized",
            Self::NotYourTurn { .. } => "not_your_turn",
            Self::SessionBusy { .. } => "session_busy",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InsufficientResources { .. } => "insufficient_resources",
            Self::AbilityOnCooldown { .. } => "ability_on_cooldown",
            Self::SessionNotActive { .. } => "session_not_active",
            Self::AlreadyExpired { .. } => "already_expired",
            Self::SettlementFailed { .. } => "settlement_failed",
        }
    }
}
