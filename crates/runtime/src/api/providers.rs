//! Asynchronous abstraction for sourcing combatant intent.
//!
//! Runtime users plug in [`ActionProvider`] implementations so duels can run
//! with human input, scripted fixtures, or bot policies.
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use duel_core::{ActorId, DuelAction, DuelSession};

use super::errors::Result;

/// Trait for choosing the next action of a combatant.
///
/// Different implementations can handle:
/// - Player input relayed by a chat adapter
/// - Bot decisions
/// - Scripted/replayed actions
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Choose an action for `actor`, who owns the current turn in `session`.
    async fn provide_action(&self, actor: &ActorId, session: &DuelSession) -> Result<DuelAction>;
}

/// Always attacks. Useful for testing or as a fallback.
pub struct BasicAttackProvider;

#[async_trait]
impl ActionProvider for BasicAttackProvider {
    async fn provide_action(&self, _actor: &ActorId, _session: &DuelSession) -> Result<DuelAction> {
        Ok(DuelAction::BasicAttack)
    }
}

/// Replays a fixed list of actions, then falls back to `BasicAttack`.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<DuelAction>>,
}

impl ScriptedProvider {
    pub fn new(actions: impl IntoIterator<Item = DuelAction>) -> Self {
        Self {
            script: Mutex::new(actions.into_iter().collect()),
        }
    }
}

#[async_trait]
impl ActionProvider for ScriptedProvider {
    async fn provide_action(&self, _actor: &ActorId, _session: &DuelSession) -> Result<DuelAction> {
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        Ok(next.unwrap_or(DuelAction::BasicAttack))
    }
}
