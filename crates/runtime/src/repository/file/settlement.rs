//! File-backed settlement log.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use duel_core::{SessionId, SettlementRecord};

use super::log::RecordLog;
use crate::repository::{RepositoryError, Result, SettlementRepository};

pub const SETTLEMENT_LOG_FILE: &str = "settlements.log";

struct LogState {
    log: RecordLog<SettlementRecord>,
    /// Session id to record offset, rebuilt from the log on open.
    index: HashMap<SessionId, u64>,
    order: Vec<SessionId>,
}

/// Durable [`SettlementRepository`] backed by an append-only [`RecordLog`].
///
/// Every insert is flushed before it reports success.
pub struct FileSettlementLog {
    state: Mutex<LogState>,
    path: PathBuf,
}

impl FileSettlementLog {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let log = RecordLog::<SettlementRecord>::open_or_create(dir, SETTLEMENT_LOG_FILE)?;
        let mut index = HashMap::new();
        let mut order = Vec::new();
        for (offset, record) in log.read_all()? {
            if index.insert(record.session_id, offset).is_some() {
                return Err(RepositoryError::CorruptedData(format!(
                    "duplicate settlement for {}",
                    record.session_id
                )));
            }
            order.push(record.session_id);
        }
        let path = log.path().to_path_buf();

        tracing::info!(
            target: "runtime::repository",
            path = %path.display(),
            records = order.len(),
            "Loaded settlement log"
        );

        Ok(Self {
            state: Mutex::new(LogState { log, index, order }),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettlementRepository for FileSettlementLog {
    fn insert_if_absent(&self, record: &SettlementRecord) -> Result<bool> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if state.index.contains_key(&record.session_id) {
            return Ok(false);
        }
        let offset = state.log.append(record)?;
        state.log.flush()?;
        state.index.insert(record.session_id, offset);
        state.order.push(record.session_id);
        Ok(true)
    }

    fn get(&self, session: SessionId) -> Result<Option<SettlementRecord>> {
        let state = self
            .state
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let Some(&offset) = state.index.get(&session) else {
            return Ok(None);
        };
        Ok(state.log.read_at_offset(offset)?.map(|(record, _)| record))
    }

    fn list(&self) -> Result<Vec<SettlementRecord>> {
        let state = self
            .state
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(state.log.read_all()?.into_iter().map(|(_, r)| r).collect())
    }
}
