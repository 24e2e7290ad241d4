//! Shared engine state behind every [`DuelHandle`](crate::DuelHandle).
//!
//! Player operations lock their session with `try_lock` and fail with
//! `SessionBusy` instead of queueing. Supervisor paths wait for the lock and
//! then re-check session state before applying a forced transition.

use std::sync::Arc;

use duel_core::env::derive_session_seed;
use duel_core::{
    AbortReason, ActorId, ContentOracle, DuelAction, DuelEnv, DuelError, DuelProposal,
    DuelSession, Escrow, RitualId, RitualResolution, RitualVerdict, RngOracle, SessionId,
    SessionMachine, SessionState, SettlementRecord, TurnReport,
};
use tracing::{debug, info, trace, warn};

use crate::api::{Result, RuntimeError};
use crate::clock::{Clock, millis};
use crate::config::RuntimeConfig;
use crate::events::{CombatEvent, EventBus, SessionEvent, SettlementEvent};
use crate::ledger::{BalanceLedger, LedgerError};
use crate::sessions::{Lookup, SessionRegistry, SessionSlot};
use crate::settlement::SettlementService;
use crate::supervisor::{TimeoutSupervisor, TimerFired, TimerKind, TimerSlot};

pub(crate) struct DuelService {
    pub(crate) config: RuntimeConfig,
    pub(crate) content: Arc<dyn ContentOracle>,
    pub(crate) rng: Arc<dyn RngOracle>,
    pub(crate) entropy: u64,
    pub(crate) ledger: Arc<dyn BalanceLedger>,
    pub(crate) registry: SessionRegistry,
    pub(crate) supervisor: TimeoutSupervisor,
    pub(crate) settlement: SettlementService,
    pub(crate) events: EventBus,
    pub(crate) clock: Clock,
}

impl DuelService {
    fn env(&self) -> DuelEnv<'_> {
        DuelEnv::new(&self.config.duel, self.rng.as_ref())
    }

    /// Active slot for a player operation, or the lifecycle error that
    /// explains why the session no longer takes one.
    fn active_slot(&self, id: SessionId) -> Result<Arc<SessionSlot>> {
        match self.registry.lookup(id) {
            Lookup::Active(slot) => Ok(slot),
            Lookup::Archived(session) if session.state == SessionState::Expired => {
                Err(DuelError::AlreadyExpired { session: id }.into())
            }
            Lookup::Archived(session) => Err(DuelError::SessionNotActive {
                state: session.state,
            }
            .into()),
            Lookup::Missing => Err(RuntimeError::SessionNotFound(id)),
        }
    }

    pub(crate) async fn propose(&self, proposal: DuelProposal) -> Result<DuelSession> {
        self.registry.ensure_available(&proposal.challenger)?;
        self.registry.ensure_available(&proposal.target)?;
        for actor in [&proposal.challenger, &proposal.target] {
            let available = self.ledger.balance(actor).await?;
            if available < proposal.wager {
                return Err(DuelError::InsufficientFunds {
                    actor: actor.clone(),
                    required: proposal.wager,
                    available,
                }
                .into());
            }
        }

        let id = self.registry.allocate_id();
        let seed = derive_session_seed(id, self.entropy);
        let session = SessionMachine::propose(
            proposal,
            &self.config.duel,
            self.content.as_ref(),
            id,
            self.clock.now(),
            seed,
        )?;
        self.registry.insert(session.clone())?;
        self.supervisor
            .arm(id, TimerKind::Accept, self.config.timeouts.accept);

        info!(
            target: "runtime::session",
            session = %id,
            challenger = %session.challenger.identity,
            target_actor = %session.target.identity,
            wager = session.wager,
            terrain = %session.terrain.id,
            "Duel proposed"
        );
        self.events.publish(SessionEvent::Proposed {
            session: id,
            challenger: session.challenger.identity.clone(),
            target: session.target.identity.clone(),
            wager: session.wager,
        });
        Ok(session)
    }

    pub(crate) async fn accept(&self, id: SessionId, actor: &ActorId) -> Result<DuelSession> {
        let slot = self.active_slot(id)?;
        let mut session = slot.try_lock()?;
        let now = self.clock.now();
        let accept_ms = millis(self.config.timeouts.accept);

        SessionMachine::new(&mut session).check_accept(actor, now, accept_ms)?;
        let escrow = self.escrow_wagers(&session).await?;
        let narrative = match SessionMachine::new(&mut session).accept(actor, now, accept_ms, escrow)
        {
            Ok(narrative) => narrative,
            Err(err) => {
                self.release_escrow(id, escrow).await;
                return Err(err.into());
            }
        };

        self.supervisor.cancel(id, TimerSlot::Accept);
        self.supervisor.arm(
            id,
            TimerKind::Turn {
                turn_index: session.turn_index,
            },
            self.config.timeouts.turn,
        );

        info!(
            target: "runtime::session",
            session = %id,
            escrowed = escrow.total(),
            "Duel accepted"
        );
        self.events.publish(SessionEvent::Accepted {
            session: id,
            narrative,
        });
        Ok(session.clone())
    }

    async fn escrow_wagers(&self, session: &DuelSession) -> Result<Escrow> {
        let wager = session.wager;
        let challenger_hold = self
            .hold_wager(&session.challenger.identity, wager)
            .await?;
        let target_hold = match self.hold_wager(&session.target.identity, wager).await {
            Ok(hold) => hold,
            Err(err) => {
                if let Err(release) = self.ledger.release(challenger_hold).await {
                    warn!(
                        target: "runtime::session",
                        session = %session.id,
                        hold = %challenger_hold,
                        error = %release,
                        "Failed to release challenger hold after rejected accept"
                    );
                }
                return Err(err);
            }
        };
        Ok(Escrow {
            challenger_hold,
            target_hold,
            amount_each: wager,
        })
    }

    async fn hold_wager(&self, actor: &ActorId, wager: u64) -> Result<duel_core::HoldId> {
        self.ledger
            .hold(actor, wager)
            .await
            .map_err(|err| match err {
                LedgerError::InsufficientFunds {
                    actor,
                    required,
                    available,
                } => DuelError::InsufficientFunds {
                    actor,
                    required,
                    available,
                }
                .into(),
                other => RuntimeError::Ledger(other),
            })
    }

    async fn release_escrow(&self, id: SessionId, escrow: Escrow) {
        for hold in [escrow.challenger_hold, escrow.target_hold] {
            if let Err(err) = self.ledger.release(hold).await {
                warn!(target: "runtime::session", session = %id, %hold, error = %err, "Failed to release hold");
            }
        }
    }

    pub(crate) async fn submit_action(
        &self,
        id: SessionId,
        actor: &ActorId,
        action: DuelAction,
    ) -> Result<TurnReport> {
        let slot = self.active_slot(id)?;
        let mut session = slot.try_lock()?;
        let now = self.clock.now();

        let report = SessionMachine::new(&mut session).submit_action(actor, &action, now, self.env())?;

        debug!(
            target: "runtime::combat",
            session = %id,
            actor = %actor,
            action = report.outcome.action.kind().as_str(),
            turn = report.outcome.turn_index,
            damage = report.outcome.damage_dealt,
            flags = ?report.outcome.flags,
            "Action resolved"
        );
        self.events.publish(CombatEvent::ActionResolved {
            session: id,
            outcome: report.outcome.clone(),
        });

        if let Some(ritual) = report.ritual_started {
            self.supervisor
                .arm(id, TimerKind::Ritual(ritual), self.config.timeouts.ritual);
            if let Some(pending) = session.ritual(ritual) {
                self.events.publish(CombatEvent::RitualStarted {
                    session: id,
                    ritual,
                    initiator: actor.clone(),
                    target: pending.target.clone(),
                });
            }
        }

        if session.is_terminal() {
            self.conclude(&mut session).await;
        } else {
            self.supervisor.arm(
                id,
                TimerKind::Turn {
                    turn_index: session.turn_index,
                },
                self.config.timeouts.turn,
            );
        }
        Ok(report)
    }

    pub(crate) async fn respond_ritual(
        &self,
        id: SessionId,
        ritual: RitualId,
        responder: &ActorId,
        verdict: RitualVerdict,
    ) -> Result<Option<RitualResolution>> {
        let slot = self.active_slot(id)?;
        let mut session = slot.try_lock()?;

        let resolution = SessionMachine::new(&mut session).resolve_ritual(
            ritual,
            verdict,
            Some(responder),
            &self.config.duel,
        )?;
        if let Some(resolution) = &resolution {
            self.supervisor.cancel(id, TimerSlot::Ritual(ritual));
            self.apply_ritual(&mut session, resolution).await;
        }
        Ok(resolution)
    }

    /// Moves the ritual penalty and records what was actually collected.
    async fn apply_ritual(&self, session: &mut DuelSession, resolution: &RitualResolution) {
        let mut collected = 0;
        if resolution.succeeded && resolution.penalty > 0 {
            collected = match self.collect_penalty(resolution).await {
                Ok(amount) => amount,
                Err(err) => {
                    warn!(
                        target: "runtime::combat",
                        session = %resolution.session,
                        ritual = %resolution.ritual,
                        error = %err,
                        "Ritual penalty could not be collected"
                    );
                    0
                }
            };
        }
        SessionMachine::new(session).record_ritual_penalty(resolution.ritual, collected);

        info!(
            target: "runtime::combat",
            session = %resolution.session,
            ritual = %resolution.ritual,
            verdict = ?resolution.verdict,
            succeeded = resolution.succeeded,
            collected,
            "Ritual resolved"
        );
        self.events.publish(CombatEvent::RitualResolved {
            resolution: resolution.clone(),
            collected,
        });
    }

    async fn collect_penalty(&self, resolution: &RitualResolution) -> Result<u64> {
        let available = self.ledger.balance(&resolution.target).await?;
        let amount = resolution.penalty.min(available);
        if amount == 0 {
            return Ok(0);
        }
        let hold = self.ledger.hold(&resolution.target, amount).await?;
        if let Err(err) = self.ledger.commit(hold, &resolution.initiator).await {
            if let Err(release) = self.ledger.release(hold).await {
                warn!(target: "runtime::combat", %hold, error = %release, "Failed to release penalty hold");
            }
            return Err(err.into());
        }
        Ok(amount)
    }

    /// Aborts a non-terminal session. Returns `false` if it was already terminal.
    pub(crate) async fn abort(&self, id: SessionId, reason: AbortReason) -> Result<bool> {
        let slot = match self.registry.lookup(id) {
            Lookup::Active(slot) => slot,
            Lookup::Archived(_) => return Ok(false),
            Lookup::Missing => return Err(RuntimeError::SessionNotFound(id)),
        };
        let mut session = slot.lock().await;
        if !SessionMachine::new(&mut session).abort(reason) {
            return Ok(false);
        }
        self.conclude(&mut session).await;
        Ok(true)
    }

    pub(crate) async fn snapshot(&self, id: SessionId) -> Result<DuelSession> {
        match self.registry.lookup(id) {
            Lookup::Active(slot) => Ok(slot.lock().await.clone()),
            Lookup::Archived(session) => Ok(*session),
            Lookup::Missing => Err(RuntimeError::SessionNotFound(id)),
        }
    }

    /// Settles a concluded session, or returns its existing record.
    pub(crate) async fn settle(&self, id: SessionId) -> Result<Option<SettlementRecord>> {
        match self.registry.lookup(id) {
            Lookup::Active(slot) => {
                let mut session = slot.lock().await;
                if !session.is_terminal() {
                    return Err(DuelError::SessionNotActive {
                        state: session.state,
                    }
                    .into());
                }
                self.settle_locked(&mut session).await
            }
            Lookup::Archived(_) => self.settlement.record(id),
            Lookup::Missing => match self.settlement.record(id)? {
                Some(record) => Ok(Some(record)),
                None => Err(RuntimeError::SessionNotFound(id)),
            },
        }
    }

    /// Timer and lock cleanup shared by every terminal transition.
    async fn conclude(&self, session: &mut DuelSession) {
        let id = session.id;
        self.supervisor.cancel_session(id);
        self.registry.release_engagement(session);

        match session.state {
            SessionState::Expired => {
                info!(target: "runtime::session", session = %id, "Proposal expired");
                self.events.publish(SessionEvent::Expired { session: id });
                self.registry.archive(session);
                return;
            }
            SessionState::Aborted => {
                let reason = session.abort_reason.unwrap_or(AbortReason::Cancelled);
                info!(target: "runtime::session", session = %id, ?reason, "Duel aborted");
                self.events.publish(SessionEvent::Aborted {
                    session: id,
                    reason,
                });
            }
            SessionState::Resolved => {
                if let Some(result) = session.result {
                    let winner = session.winner().cloned();
                    info!(
                        target: "runtime::session",
                        session = %id,
                        winner = winner.as_ref().map(|w| w.as_str()).unwrap_or("none"),
                        turns = session.turn_index,
                        "Duel resolved"
                    );
                    self.events.publish(SessionEvent::Resolved {
                        session: id,
                        result,
                        winner,
                    });
                }
            }
            SessionState::Proposed | SessionState::InProgress => return,
        }

        // Failure is logged and rescheduled inside.
        let _ = self.settle_locked(session).await;
    }

    /// Settles under the session lock, archiving on success and scheduling a
    /// retry on failure.
    async fn settle_locked(&self, session: &mut DuelSession) -> Result<Option<SettlementRecord>> {
        let now = self.clock.now();
        match self.settlement.settle(session, now).await {
            Ok(record) => {
                SessionMachine::new(session).mark_settled(now);
                self.registry.archive(session);
                Ok(record)
            }
            Err(err) => {
                let delay = self.settlement.policy().retry_delay;
                self.supervisor
                    .arm(session.id, TimerKind::SettlementRetry, delay);
                self.events.publish(SettlementEvent::RetryScheduled {
                    session: session.id,
                    delay_ms: millis(delay),
                });
                Err(err)
            }
        }
    }

    /// Applies a fired timer if it still matches the session state.
    pub(crate) async fn handle_timer(&self, fired: TimerFired) {
        let Some(slot) = self.registry.get(fired.session) else {
            trace!(target: "runtime::supervisor", session = %fired.session, kind = ?fired.kind, "Timer for concluded session ignored");
            return;
        };
        let mut session = slot.lock().await;

        match fired.kind {
            TimerKind::Accept => {
                if SessionMachine::new(&mut session).expire() {
                    self.conclude(&mut session).await;
                }
            }
            TimerKind::Turn { turn_index } => {
                let current = session.state == SessionState::InProgress
                    && session.turn_index == turn_index;
                if !current {
                    trace!(target: "runtime::supervisor", session = %fired.session, turn_index, "Stale turn timer ignored");
                    return;
                }
                info!(
                    target: "runtime::supervisor",
                    session = %fired.session,
                    turn_owner = %session.turn_owner_id(),
                    turn = turn_index,
                    "Turn timed out"
                );
                if SessionMachine::new(&mut session).abort(AbortReason::TurnTimeout) {
                    self.conclude(&mut session).await;
                }
            }
            TimerKind::Ritual(ritual) => {
                let resolved = SessionMachine::new(&mut session).resolve_ritual(
                    ritual,
                    RitualVerdict::TimedOut,
                    None,
                    &self.config.duel,
                );
                match resolved {
                    Ok(Some(resolution)) => self.apply_ritual(&mut session, &resolution).await,
                    Ok(None) => {
                        trace!(target: "runtime::supervisor", session = %fired.session, %ritual, "Ritual already resolved")
                    }
                    Err(err) => {
                        warn!(target: "runtime::supervisor", session = %fired.session, %ritual, error = %err, "Ritual timeout rejected")
                    }
                }
            }
            TimerKind::SettlementRetry => {
                if session.needs_settlement() {
                    let _ = self.settle_locked(&mut session).await;
                }
            }
        }
    }
}
