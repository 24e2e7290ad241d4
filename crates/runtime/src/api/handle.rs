//! Cloneable façade exposing duel operations.
//!
//! [`DuelHandle`] is the surface adapters call: every method is a
//! request/response call returning a typed result or a [`RuntimeError`].
use std::sync::Arc;

use duel_core::{
    AbortReason, ActorId, DuelAction, DuelProposal, DuelSession, RitualId, RitualResolution,
    RitualVerdict, SessionId, SettlementRecord, TurnReport,
};
use tokio::sync::broadcast;

use super::errors::Result;
use super::providers::ActionProvider;
use crate::events::{Event, EventBus, Topic};
use crate::service::DuelService;

/// A ritual target's answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RitualResponse {
    /// The target gives in; the ritual succeeds.
    Submit,
    /// The target fights back; the ritual backfires on its initiator.
    Resist,
}

impl From<RitualResponse> for RitualVerdict {
    fn from(response: RitualResponse) -> Self {
        match response {
            RitualResponse::Submit => RitualVerdict::Submit,
            RitualResponse::Resist => RitualVerdict::Resist,
        }
    }
}

#[derive(Clone)]
pub struct DuelHandle {
    service: Arc<DuelService>,
}

impl DuelHandle {
    pub(crate) fn new(service: Arc<DuelService>) -> Self {
        Self { service }
    }

    /// Validates funds and payload and opens a session in `Proposed`.
    pub async fn propose_duel(&self, proposal: DuelProposal) -> Result<DuelSession> {
        self.service.propose(proposal).await
    }

    /// Escrows both wagers and starts the duel. Only the target may accept.
    pub async fn accept(&self, session: SessionId, actor: &ActorId) -> Result<DuelSession> {
        self.service.accept(session, actor).await
    }

    pub async fn submit_action(
        &self,
        session: SessionId,
        actor: &ActorId,
        action: DuelAction,
    ) -> Result<TurnReport> {
        self.service.submit_action(session, actor, action).await
    }

    /// Answers a pending ritual addressed at `responder`.
    ///
    /// Returns `None` if the ritual already resolved or was cancelled.
    pub async fn respond_ritual(
        &self,
        session: SessionId,
        ritual: RitualId,
        responder: &ActorId,
        response: RitualResponse,
    ) -> Result<Option<RitualResolution>> {
        self.service
            .respond_ritual(session, ritual, responder, response.into())
            .await
    }

    /// Aborts a live session and refunds any escrow.
    ///
    /// Returns `false` when the session was already terminal.
    pub async fn abort(&self, session: SessionId, reason: AbortReason) -> Result<bool> {
        self.service.abort(session, reason).await
    }

    /// Read-only copy of the session, live or archived.
    pub async fn snapshot(&self, session: SessionId) -> Result<DuelSession> {
        self.service.snapshot(session).await
    }

    /// Settles a concluded session now, or returns its existing record.
    pub async fn settle(&self, session: SessionId) -> Result<Option<SettlementRecord>> {
        self.service.settle(session).await
    }

    pub fn settlement(&self, session: SessionId) -> Result<Option<SettlementRecord>> {
        self.service.settlement.record(session)
    }

    pub fn settlements(&self) -> Result<Vec<SettlementRecord>> {
        self.service.settlement.records()
    }

    /// Asks `provider` for the turn owner's action and submits it.
    pub async fn play_turn(
        &self,
        session: SessionId,
        provider: &dyn ActionProvider,
    ) -> Result<TurnReport> {
        let snapshot = self.snapshot(session).await?;
        let actor = snapshot.turn_owner_id().clone();
        let action = provider.provide_action(&actor, &snapshot).await?;
        self.submit_action(session, &actor, action).await
    }

    /// The session `actor` currently fights in, if any.
    pub fn engaged_in(&self, actor: &ActorId) -> Option<SessionId> {
        self.service.registry.engaged_in(actor)
    }

    pub fn active_sessions(&self) -> usize {
        self.service.registry.active_count()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.service.events
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.service.events.subscribe(topic)
    }
}
