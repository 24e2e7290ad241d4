//! Balance ledger seam.
//!
//! Wagers and ritual penalties move through holds: funds are reserved first
//! and later either released to their owner or committed to a destination.

mod error;
mod memory;
mod traits;

pub use error::{LedgerError, LedgerResult};
pub use memory::InMemoryLedger;
pub use traits::BalanceLedger;
