//! Prints duel events and answers rituals on behalf of the spectator.
use duel_core::{ActorId, DuelResult};
use duel_runtime::{
    CombatEvent, DuelHandle, Event, RitualResponse, SessionEvent, SettlementEvent, Topic,
};
use tokio::sync::{broadcast, oneshot};

use crate::config::{OutputFormat, RitualPolicy};

pub struct Narrator {
    handle: DuelHandle,
    format: OutputFormat,
    spectator: Option<ActorId>,
    policy: RitualPolicy,
}

impl Narrator {
    pub fn new(handle: DuelHandle, format: OutputFormat) -> Self {
        Self {
            handle,
            format,
            spectator: None,
            policy: RitualPolicy::Ignore,
        }
    }

    pub fn with_spectator(mut self, spectator: Option<ActorId>, policy: RitualPolicy) -> Self {
        self.spectator = spectator;
        self.policy = policy;
        self
    }

    /// Consumes events until `shutdown` fires, then drains what is buffered.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut session = self.handle.subscribe(Topic::Session);
        let mut combat = self.handle.subscribe(Topic::Combat);
        let mut settlement = self.handle.subscribe(Topic::Settlement);

        loop {
            let received = tokio::select! {
                event = session.recv() => event,
                event = combat.recv() => event,
                event = settlement.recv() => event,
                _ = &mut shutdown => break,
            };
            match received {
                Ok(event) => self.handle_event(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Narrator lagged behind, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }

        for receiver in [&mut session, &mut combat, &mut settlement] {
            while let Ok(event) = receiver.try_recv() {
                self.print(&event);
            }
        }
    }

    async fn handle_event(&self, event: Event) {
        self.print(&event);

        let Event::Combat(CombatEvent::RitualStarted {
            session,
            ritual,
            target,
            ..
        }) = &event
        else {
            return;
        };
        if self.spectator.as_ref() != Some(target) {
            return;
        }
        let response = match self.policy {
            RitualPolicy::Submit => RitualResponse::Submit,
            RitualPolicy::Resist => RitualResponse::Resist,
            RitualPolicy::Ignore => return,
        };
        if let Err(e) = self
            .handle
            .respond_ritual(*session, *ritual, target, response)
            .await
        {
            tracing::warn!("Spectator response to ritual {} failed: {}", ritual, e);
        }
    }

    fn print(&self, event: &Event) {
        match self.format {
            OutputFormat::Json => match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!("Failed to encode event: {}", e),
            },
            OutputFormat::Text => {
                for line in describe(event) {
                    println!("{line}");
                }
            }
        }
    }
}

/// Human-readable lines for one event.
pub fn describe(event: &Event) -> Vec<String> {
    match event {
        Event::Session(SessionEvent::Proposed {
            session,
            challenger,
            target,
            wager,
        }) => vec![format!(
            "[{session}] {challenger} challenges {target} for {wager}."
        )],
        Event::Session(SessionEvent::Accepted { narrative, .. }) => narrative.clone(),
        Event::Session(SessionEvent::Expired { session }) => {
            vec![format!("[{session}] The challenge went unanswered.")]
        }
        Event::Session(SessionEvent::Aborted { session, reason }) => {
            vec![format!("[{session}] Duel aborted: {reason:?}.")]
        }
        Event::Session(SessionEvent::Resolved { winner, result, .. }) => match (winner, result) {
            (Some(winner), _) => vec![format!("{winner} wins the duel.")],
            (None, DuelResult::MutualLoss) => vec!["Both fighters fall.".to_owned()],
            (None, _) => Vec::new(),
        },
        Event::Combat(CombatEvent::ActionResolved { outcome, .. }) => outcome
            .narrative
            .iter()
            .map(|line| format!("  turn {:>2}: {line}", outcome.turn_index + 1))
            .collect(),
        Event::Combat(CombatEvent::RitualStarted {
            initiator, target, ..
        }) => vec![format!("  {initiator} calls a ritual upon {target}.")],
        Event::Combat(CombatEvent::RitualResolved {
            resolution,
            collected,
        }) => {
            if resolution.succeeded {
                vec![format!(
                    "  The ritual takes hold: {} pays {} to {}.",
                    resolution.target, collected, resolution.initiator
                )]
            } else {
                vec![format!(
                    "  {} resists and the ritual backfires on {}.",
                    resolution.target, resolution.initiator
                )]
            }
        }
        Event::Settlement(SettlementEvent::Settled { record }) => {
            let outcome: &'static str = record.outcome.into();
            vec![format!(
                "[{}] Settled as {outcome}: payout {}, refunded {}.",
                record.session_id, record.payout, record.refunded
            )]
        }
        Event::Settlement(SettlementEvent::AttemptFailed { .. }) => Vec::new(),
        Event::Settlement(SettlementEvent::RetryScheduled { session, delay_ms }) => {
            vec![format!(
                "[{session}] Settlement delayed, retrying in {delay_ms} ms."
            )]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_core::{CombatantSlot, SessionId};

    #[test]
    fn victory_names_the_winner() {
        let event = Event::Session(SessionEvent::Resolved {
            session: SessionId(3),
            result: DuelResult::Victory {
                winner: CombatantSlot::Target,
            },
            winner: Some(ActorId::new("bob")),
        });
        assert_eq!(describe(&event), vec!["bob wins the duel.".to_owned()]);
    }

    #[test]
    fn failed_attempts_stay_out_of_the_narrative() {
        let event = Event::Settlement(SettlementEvent::AttemptFailed {
            session: SessionId(3),
            attempt: 1,
            error: "ledger unavailable".into(),
        });
        assert!(describe(&event).is_empty());
    }
}
