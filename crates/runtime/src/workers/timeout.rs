//! Applies fired timers to their sessions.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::debug;

use crate::service::DuelService;
use crate::supervisor::TimerFired;

/// Receives [`TimerFired`] notifications and applies each on its own task,
/// so a slow settlement retry never delays another session's deadline.
pub(crate) struct TimeoutWorker {
    service: Arc<DuelService>,
    fired_rx: mpsc::Receiver<TimerFired>,
    shutdown_rx: oneshot::Receiver<()>,
}

impl TimeoutWorker {
    pub(crate) fn new(
        service: Arc<DuelService>,
        fired_rx: mpsc::Receiver<TimerFired>,
        shutdown_rx: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            service,
            fired_rx,
            shutdown_rx,
        }
    }

    /// Main worker loop.
    pub(crate) async fn run(mut self) {
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                Some(fired) = self.fired_rx.recv() => {
                    debug!(target: "runtime::supervisor", session = %fired.session, kind = ?fired.kind, "Timer fired");
                    let service = Arc::clone(&self.service);
                    in_flight.spawn(async move { service.handle_timer(fired).await });
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(err) = joined {
                        debug!(target: "runtime::supervisor", error = %err, "Timer task ended abnormally");
                    }
                }
                _ = &mut self.shutdown_rx => break,
                else => break,
            }
        }
        while in_flight.join_next().await.is_some() {}
        debug!(target: "runtime::supervisor", "Timeout worker stopped");
    }
}
