use std::collections::{HashMap, VecDeque};

use duel_core::{DuelSession, SessionId};

/// Bounded store of concluded sessions, evicting the oldest first.
#[derive(Debug)]
pub(crate) struct Archive {
    capacity: usize,
    order: VecDeque<SessionId>,
    sessions: HashMap<SessionId, DuelSession>,
}

impl Archive {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity.min(1024)),
            sessions: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, session: DuelSession) {
        if self.capacity == 0 {
            return;
        }
        let id = session.id;
        if self.sessions.insert(id, session).is_none() {
            self.order.push_back(id);
        }
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.sessions.remove(&evicted);
            }
        }
    }

    pub(crate) fn get(&self, id: SessionId) -> Option<&DuelSession> {
        self.sessions.get(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}
