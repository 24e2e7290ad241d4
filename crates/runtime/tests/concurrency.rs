//! Per-session exclusion while an operation is in flight.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::*;
use duel_core::{ActorId, DuelAction, DuelError, HoldId, SessionState};
use duel_runtime::{
    BalanceLedger, BasicAttackProvider, DuelRuntime, InMemoryLedger, LedgerResult, RuntimeError,
};
use tokio::sync::Notify;

/// Ledger whose holds park until the test opens the gate.
struct GatedLedger {
    inner: InMemoryLedger,
    gated: AtomicBool,
    entered: Notify,
    gate: Notify,
}

impl GatedLedger {
    fn new(inner: InMemoryLedger) -> Self {
        Self {
            inner,
            gated: AtomicBool::new(false),
            entered: Notify::new(),
            gate: Notify::new(),
        }
    }
}

#[async_trait]
impl BalanceLedger for GatedLedger {
    async fn balance(&self, actor: &ActorId) -> LedgerResult<u64> {
        self.inner.balance(actor).await
    }

    async fn hold(&self, actor: &ActorId, amount: u64) -> LedgerResult<HoldId> {
        if self.gated.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.gate.notified().await;
        }
        self.inner.hold(actor, amount).await
    }

    async fn release(&self, hold: HoldId) -> LedgerResult<()> {
        self.inner.release(hold).await
    }

    async fn commit(&self, hold: HoldId, destination: &ActorId) -> LedgerResult<()> {
        self.inner.commit(hold, destination).await
    }
}

#[tokio::test]
async fn operations_during_an_inflight_accept_are_busy() {
    let ledger = Arc::new(GatedLedger::new(InMemoryLedger::with_balances([
        ("alice", STARTING_BALANCE),
        ("bob", STARTING_BALANCE),
    ])));
    let runtime = DuelRuntime::builder()
        .rng(Arc::new(SteadyRng))
        .ledger(ledger.clone())
        .default_provider(BasicAttackProvider)
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();

    let id = handle
        .propose_duel(proposal(alice(), bob(), 100))
        .await
        .expect("proposal")
        .id;

    ledger.gated.store(true, Ordering::SeqCst);
    let first = tokio::spawn({
        let handle = handle.clone();
        async move { handle.accept(id, &bob()).await }
    });
    ledger.entered.notified().await;

    let second = handle.accept(id, &bob()).await.unwrap_err();
    assert!(matches!(
        second,
        RuntimeError::Duel(DuelError::SessionBusy { session }) if session == id
    ));
    assert!(second.is_retryable());

    let submit = handle
        .submit_action(id, &alice(), DuelAction::BasicAttack)
        .await
        .unwrap_err();
    assert!(submit.is_retryable());

    ledger.gate.notify_one();
    let accepted = first
        .await
        .expect("accept task should not panic")
        .expect("first accept wins");
    assert_eq!(accepted.state, SessionState::InProgress);

    // Exactly one pair of wagers went into escrow.
    assert_eq!(ledger.inner.escrowed_total(), 200);
    assert_eq!(ledger.inner.open_holds(), 2);

    handle
        .submit_action(id, &alice(), DuelAction::BasicAttack)
        .await
        .expect("lock is free again");
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn independent_sessions_do_not_block_each_other() {
    let h = harness(Default::default()).await;
    let first = h.start_duel(100).await;

    h.ledger.deposit("dave", STARTING_BALANCE);
    let second = h
        .handle
        .propose_duel(proposal(carol(), ActorId::new("dave"), 50))
        .await
        .expect("carol and dave are free")
        .id;
    h.handle
        .accept(second, &ActorId::new("dave"))
        .await
        .expect("dave accepts");

    let (first_actor, second_actor) = (alice(), carol());
    let (a, b) = tokio::join!(
        h.handle.submit_action(first, &first_actor, DuelAction::BasicAttack),
        h.handle.submit_action(second, &second_actor, DuelAction::BasicAttack),
    );
    a.expect("first duel advances");
    b.expect("second duel advances");
    assert_eq!(h.handle.active_sessions(), 2);
    assert_eq!(h.ledger.escrowed_total(), 300);
}
