//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod clean;
mod read_settlements;
mod tail_logs;

pub use clean::Clean;
pub use read_settlements::ReadSettlements;
pub use tail_logs::TailLogs;
