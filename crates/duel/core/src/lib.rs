//! Deterministic duel rules shared by the runtime and offline tools.
//!
//! `duel-core` defines the canonical combat rules (probability rolls, status
//! effects, action resolution) and the session lifecycle as pure functions
//! over [`DuelSession`]. Nothing here performs I/O, reads a clock, or spawns
//! work: callers pass timestamps and seeds in, and receive outcomes back.
//! All session mutation flows through [`engine::SessionMachine`].
pub mod action;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use action::{ActionKind, ActionOutcome, DuelAction, HpChange, OutcomeFlags};
pub use config::{DuelConfig, RitualConfig};
pub use engine::{CombatResolver, DuelProposal, SessionMachine, TurnReport};
pub use env::{
    AbilityId, Catalog, CharacterClass, ClassId, ContentOracle, DuelEnv, EventEffect,
    EventTrigger, PassiveModifier, PcgRng, RngOracle, SpecialAbility, SpecialEffect,
    SpecialEvent, StatusGrant, Terrain, TerrainId, TerrainModifiers,
};
pub use error::{ClassifiedError, DuelError, ErrorCategory, ErrorSeverity, ValidationError};
pub use state::{
    AbortReason, ActorId, Combatant, CombatantSlot, Cooldowns, DuelResult, DuelSession, Escrow,
    HitPoints, HoldId, HoldInstruction, PendingRitual, RitualId, RitualResolution, RitualStatus,
    RitualVerdict, SessionId, SessionState, SettlementOutcome, SettlementPlan, SettlementRecord,
    StackPolicy, StatusEffect, StatusEffectKind, StatusEffects, Timestamp,
};
