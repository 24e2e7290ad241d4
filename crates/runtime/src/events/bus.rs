//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;

use super::types::{CombatEvent, SessionEvent, SettlementEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Proposal, acceptance and terminal transitions
    Session,
    /// Resolved actions and rituals
    Combat,
    /// Payouts and retries
    Settlement,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Session, Topic::Combat, Topic::Settlement];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Session(SessionEvent),
    Combat(CombatEvent),
    Settlement(SettlementEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Session(_) => Topic::Session,
            Event::Combat(_) => Topic::Combat,
            Event::Settlement(_) => Topic::Settlement,
        }
    }
}

impl From<SessionEvent> for Event {
    fn from(event: SessionEvent) -> Self {
        Event::Session(event)
    }
}

impl From<CombatEvent> for Event {
    fn from(event: CombatEvent) -> Self {
        Event::Combat(event)
    }
}

impl From<SettlementEvent> for Event {
    fn from(event: SettlementEvent) -> Self {
        Event::Settlement(event)
    }
}

/// Topic-based event bus
///
/// One broadcast channel per topic, created up front. Publishing is
/// best-effort: an event nobody listens to is dropped.
#[derive(Clone)]
pub struct EventBus {
    session: broadcast::Sender<Event>,
    combat: broadcast::Sender<Event>,
    settlement: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            session: broadcast::channel(capacity).0,
            combat: broadcast::channel(capacity).0,
            settlement: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Session => &self.session,
            Topic::Combat => &self.combat,
            Topic::Settlement => &self.settlement,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", "No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
