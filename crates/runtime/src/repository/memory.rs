//! In-memory settlement repository for tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::RwLock;

use duel_core::{SessionId, SettlementRecord};

use super::{RepositoryError, Result, SettlementRepository};

#[derive(Default)]
struct Records {
    order: Vec<SessionId>,
    by_session: HashMap<SessionId, SettlementRecord>,
}

/// Simple in-memory settlement repository.
#[derive(Default)]
pub struct InMemorySettlementRepo {
    records: RwLock<Records>,
}

impl InMemorySettlementRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .map(|records| records.order.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SettlementRepository for InMemorySettlementRepo {
    fn insert_if_absent(&self, record: &SettlementRecord) -> Result<bool> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if records.by_session.contains_key(&record.session_id) {
            return Ok(false);
        }
        records.order.push(record.session_id);
        records.by_session.insert(record.session_id, record.clone());
        Ok(true)
    }

    fn get(&self, session: SessionId) -> Result<Option<SettlementRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.by_session.get(&session).cloned())
    }

    fn list(&self) -> Result<Vec<SettlementRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records
            .order
            .iter()
            .filter_map(|id| records.by_session.get(id).cloned())
            .collect())
    }
}
