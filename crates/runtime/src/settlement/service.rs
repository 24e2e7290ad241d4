//! Executes a [`SettlementPlan`] against the ledger exactly once per session.
//!
//! The repository record is the idempotency key: it is written only after
//! every hold instruction succeeded, and a session that already has a record
//! is never settled again. Ledger calls are idempotent per hold, so a plan
//! that failed halfway is replayed from the start.

use std::sync::Arc;

use duel_core::{
    DuelError, DuelSession, HoldInstruction, SessionId, SettlementPlan, SettlementRecord,
    Timestamp,
};
use tracing::{debug, error, info, warn};

use crate::api::{Result, RuntimeError};
use crate::config::RetryPolicy;
use crate::events::{EventBus, SettlementEvent};
use crate::ledger::{BalanceLedger, LedgerError};
use crate::repository::SettlementRepository;

pub struct SettlementService {
    ledger: Arc<dyn BalanceLedger>,
    repository: Arc<dyn SettlementRepository>,
    policy: RetryPolicy,
    events: EventBus,
}

impl SettlementService {
    pub fn new(
        ledger: Arc<dyn BalanceLedger>,
        repository: Arc<dyn SettlementRepository>,
        policy: RetryPolicy,
        events: EventBus,
    ) -> Self {
        Self {
            ledger,
            repository,
            policy,
            events,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn record(&self, session: SessionId) -> Result<Option<SettlementRecord>> {
        Ok(self.repository.get(session)?)
    }

    pub fn records(&self) -> Result<Vec<SettlementRecord>> {
        Ok(self.repository.list()?)
    }

    /// Settles a concluded session.
    ///
    /// Returns the existing record when the session was already settled and
    /// `None` when nothing is owed (the session is not `Resolved`/`Aborted`).
    /// Fails with [`DuelError::SettlementFailed`] after the inline attempts
    /// are exhausted; the caller schedules the next retry.
    pub async fn settle(
        &self,
        session: &DuelSession,
        now: Timestamp,
    ) -> Result<Option<SettlementRecord>> {
        if let Some(existing) = self.repository.get(session.id)? {
            debug!(
                target: "runtime::settlement",
                session = %session.id,
                "Already settled; skipping"
            );
            return Ok(Some(existing));
        }
        let Some(plan) = SettlementPlan::for_session(session) else {
            return Ok(None);
        };

        let attempts = self.policy.inline_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.execute(&plan).await {
                Ok(()) => break,
                Err(err) => {
                    warn!(
                        target: "runtime::settlement",
                        session = %session.id,
                        attempt,
                        error = %err,
                        "Settlement attempt failed"
                    );
                    self.events.publish(SettlementEvent::AttemptFailed {
                        session: session.id,
                        attempt,
                        error: err.to_string(),
                    });
                    if attempt >= attempts || !err.is_transient() {
                        error!(
                            target: "runtime::settlement",
                            session = %session.id,
                            attempts = attempt,
                            "Settlement attempts exhausted"
                        );
                        return Err(DuelError::SettlementFailed {
                            session: session.id,
                            reason: err.to_string(),
                        }
                        .into());
                    }
                    tokio::time::sleep(self.policy.backoff(attempt)).await;
                    attempt += 1;
                }
            }
        }

        let record = plan.into_record(now);
        if !self.repository.insert_if_absent(&record)? {
            return self
                .repository
                .get(session.id)
                .map_err(RuntimeError::from);
        }

        info!(
            target: "runtime::settlement",
            session = %record.session_id,
            outcome = ?record.outcome,
            winner = record.winner.as_ref().map(|w| w.as_str()).unwrap_or("-"),
            payout = record.payout,
            refunded = record.refunded,
            "Session settled"
        );
        self.events.publish(SettlementEvent::Settled {
            record: record.clone(),
        });
        Ok(Some(record))
    }

    async fn execute(&self, plan: &SettlementPlan) -> std::result::Result<(), LedgerError> {
        for instruction in &plan.instructions {
            match instruction {
                HoldInstruction::Commit { hold, destination } => {
                    self.ledger.commit(*hold, destination).await?
                }
                HoldInstruction::Release { hold } => self.ledger.release(*hold).await?,
            }
        }
        Ok(())
    }
}
