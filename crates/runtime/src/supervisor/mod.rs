//! Per-session deadline timers.
//!
//! The supervisor only schedules. When a timer elapses it sends a
//! [`TimerFired`] to the timeout worker, which locks the session and applies
//! the forced transition. Whether a firing still applies is decided there by
//! checking session state, so a timer racing a player action is harmless.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use duel_core::{RitualId, SessionId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::clock::millis;

/// What a timer enforces when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Expires an unanswered proposal.
    Accept,
    /// Aborts the session if nobody acted since `turn_index` was reached.
    Turn { turn_index: u32 },
    /// Resolves a pending ritual as if the target submitted.
    Ritual(RitualId),
    /// Re-runs a settlement that exhausted its inline attempts.
    SettlementRetry,
}

/// Identity of a timer within its session; arming a slot replaces its timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    Accept,
    Turn,
    Ritual(RitualId),
    SettlementRetry,
}

impl TimerKind {
    pub fn slot(self) -> TimerSlot {
        match self {
            TimerKind::Accept => TimerSlot::Accept,
            TimerKind::Turn { .. } => TimerSlot::Turn,
            TimerKind::Ritual(id) => TimerSlot::Ritual(id),
            TimerKind::SettlementRetry => TimerSlot::SettlementRetry,
        }
    }
}

/// Notification sent when a timer elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerFired {
    pub session: SessionId,
    pub kind: TimerKind,
}

/// Schedules and cancels session timers.
#[derive(Debug)]
pub struct TimeoutSupervisor {
    timers: Mutex<HashMap<(SessionId, TimerSlot), JoinHandle<()>>>,
    fired_tx: mpsc::Sender<TimerFired>,
}

impl TimeoutSupervisor {
    pub fn new(fired_tx: mpsc::Sender<TimerFired>) -> Self {
        Self {
            timers: Mutex::new(HashMap::new()),
            fired_tx,
        }
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<(SessionId, TimerSlot), JoinHandle<()>>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a timer, replacing any timer in the same slot.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&self, session: SessionId, kind: TimerKind, after: Duration) {
        let fired_tx = self.fired_tx.clone();
        let deadline = tokio::time::Instant::now() + after;
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if fired_tx.send(TimerFired { session, kind }).await.is_err() {
                trace!(target: "runtime::supervisor", %session, "Timeout worker gone; dropping timer");
            }
        });

        if let Some(previous) = self.timers().insert((session, kind.slot()), task) {
            previous.abort();
        }
        debug!(
            target: "runtime::supervisor",
            %session,
            ?kind,
            after_ms = millis(after),
            "Armed timer"
        );
    }

    pub fn cancel(&self, session: SessionId, slot: TimerSlot) {
        if let Some(task) = self.timers().remove(&(session, slot)) {
            task.abort();
            debug!(target: "runtime::supervisor", %session, ?slot, "Cancelled timer");
        }
    }

    /// Cancels every timer of a session that reached a terminal state.
    pub fn cancel_session(&self, session: SessionId) {
        let mut timers = self.timers();
        let keys: Vec<_> = timers.keys().filter(|(id, _)| *id == session).copied().collect();
        for key in &keys {
            if let Some(task) = timers.remove(key) {
                task.abort();
            }
        }
        if !keys.is_empty() {
            debug!(target: "runtime::supervisor", %session, count = keys.len(), "Cancelled session timers");
        }
    }

    /// Timers still scheduled for `session`, counting elapsed ones not yet cleared.
    pub fn armed(&self, session: SessionId) -> Vec<TimerSlot> {
        self.timers()
            .iter()
            .filter(|((id, _), task)| *id == session && !task.is_finished())
            .map(|((_, slot), _)| *slot)
            .collect()
    }

    pub fn shutdown(&self) {
        for (_, task) in self.timers().drain() {
            task.abort();
        }
    }
}

impl Drop for TimeoutSupervisor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
