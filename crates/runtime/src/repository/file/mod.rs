mod log;
mod settlement;

pub use log::RecordLog;
pub use settlement::{FileSettlementLog, SETTLEMENT_LOG_FILE};
