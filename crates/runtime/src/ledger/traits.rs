use async_trait::async_trait;
use duel_core::{ActorId, HoldId};

use super::LedgerResult;

/// External balance store the engine escrows wagers in.
///
/// `release` and `commit` must be idempotent per hold: repeating a call that
/// already took effect succeeds without moving funds again, so settlement can
/// replay a partially applied plan.
#[async_trait]
pub trait BalanceLedger: Send + Sync {
    /// Spendable balance, excluding funds currently held.
    async fn balance(&self, actor: &ActorId) -> LedgerResult<u64>;

    /// Reserves `amount` of the actor's balance.
    async fn hold(&self, actor: &ActorId, amount: u64) -> LedgerResult<HoldId>;

    /// Returns held funds to their owner.
    async fn release(&self, hold: HoldId) -> LedgerResult<()>;

    /// Moves held funds to `destination`.
    async fn commit(&self, hold: HoldId, destination: &ActorId) -> LedgerResult<()>;
}
