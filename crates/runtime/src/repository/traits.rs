use duel_core::{SessionId, SettlementRecord};

use super::Result;

/// Append-only store of concluded sessions.
///
/// The session id is the idempotency key: a second insert for the same
/// session never replaces the first record.
pub trait SettlementRepository: Send + Sync {
    /// Stores `record` unless one exists for its session.
    ///
    /// Returns `true` when the record was written.
    fn insert_if_absent(&self, record: &SettlementRecord) -> Result<bool>;

    fn get(&self, session: SessionId) -> Result<Option<SettlementRecord>>;

    /// All records in insertion order.
    fn list(&self) -> Result<Vec<SettlementRecord>>;
}
