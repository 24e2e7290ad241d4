//! Payout of concluded sessions.

mod service;

pub use service::SettlementService;
