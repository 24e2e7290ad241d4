//! Runtime orchestration for wagered duels.
//!
//! This crate wraps the pure rules of `duel-core` in an imperative shell:
//! a session registry with per-session locking, deadline timers, ledger
//! escrow and settlement, and a topic event bus. Consumers embed
//! [`DuelRuntime`] and interact with sessions through [`DuelHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`ledger`] and [`repository`] are the balance and persistence seams
//! - [`supervisor`] schedules timeouts; the worker applying them stays internal
pub mod api;
pub mod clock;
pub mod config;
pub mod events;
pub mod ledger;
pub mod repository;
pub mod runtime;
pub mod sessions;
pub mod settlement;
pub mod supervisor;

mod service;
mod workers;

pub use api::{
    ActionProvider, BasicAttackProvider, DuelHandle, ProviderRegistry, Result, RitualResponse,
    RuntimeError, ScriptedProvider,
};
pub use clock::Clock;
pub use config::{RetryPolicy, RuntimeConfig, TimeoutConfig};
pub use events::{CombatEvent, Event, EventBus, SessionEvent, SettlementEvent, Topic};
pub use ledger::{BalanceLedger, InMemoryLedger, LedgerError, LedgerResult};
pub use repository::{
    FileSettlementLog, InMemorySettlementRepo, RecordLog, RepositoryError, SETTLEMENT_LOG_FILE,
    SettlementRepository,
};
pub use runtime::{DuelRuntime, DuelRuntimeBuilder};
pub use supervisor::{TimeoutSupervisor, TimerFired, TimerKind, TimerSlot};
