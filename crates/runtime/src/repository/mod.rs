//! Persistence for concluded sessions.
//!
//! Live sessions stay in memory in the session registry; only the
//! [`SettlementRecord`](duel_core::SettlementRecord) of each concluded
//! session is stored, once, keyed by session id.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::{FileSettlementLog, RecordLog, SETTLEMENT_LOG_FILE};
pub use memory::InMemorySettlementRepo;
pub use traits::SettlementRepository;
