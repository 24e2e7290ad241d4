//! Settlement idempotence and the on-disk settlement log.

mod common;

use std::sync::Arc;

use common::*;
use duel_core::{DuelAction, SettlementOutcome};
use duel_runtime::{
    BasicAttackProvider, DuelRuntime, FileSettlementLog, InMemoryLedger, RuntimeConfig,
    SettlementRepository,
};
use tempfile::TempDir;

#[tokio::test]
async fn settling_twice_returns_the_stored_record() {
    let h = harness(one_hit_config()).await;
    let id = h.start_duel(100).await;
    h.handle
        .submit_action(id, &alice(), DuelAction::BasicAttack)
        .await
        .expect("finishing blow");

    let first = h.handle.settle(id).await.expect("settle").expect("record");
    let second = h.handle.settle(id).await.expect("settle").expect("record");

    assert_eq!(first, second);
    assert_eq!(first.outcome, SettlementOutcome::Victory);
    assert_eq!(h.repo.len(), 1);
    assert_eq!(h.balance(&alice()), STARTING_BALANCE + 100);
    assert_eq!(h.balance(&bob()), STARTING_BALANCE - 100);
    assert_eq!(h.handle.settlements().expect("list"), vec![first]);
}

#[tokio::test]
async fn settling_a_live_duel_is_rejected() {
    let h = harness(RuntimeConfig::default()).await;
    let id = h.start_duel(100).await;

    let err = h.handle.settle(id).await.unwrap_err();

    assert_eq!(err.category(), duel_core::ErrorCategory::Lifecycle);
    assert!(h.repo.is_empty());
    assert_eq!(h.ledger.escrowed_total(), 200);
}

#[tokio::test]
async fn records_survive_in_the_settlement_log() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = one_hit_config();
    config.settlement_log_dir = Some(dir.path().to_path_buf());

    let ledger = Arc::new(InMemoryLedger::with_balances([
        ("alice", STARTING_BALANCE),
        ("bob", STARTING_BALANCE),
    ]));
    let runtime = DuelRuntime::builder()
        .config(config)
        .rng(Arc::new(SteadyRng))
        .ledger(ledger)
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
    handle.accept(id, &bob()).await.expect("accept");
    let finished = runtime.run_to_completion(id).await.expect("duel finishes");
    assert!(finished.settled_at.is_some());
    let stored = handle.settlement(id).expect("repo").expect("record");
    drop(handle);
    runtime.shutdown().await.expect("shutdown");

    let log = FileSettlementLog::open(dir.path()).expect("reopen log");
    assert_eq!(log.get(id).expect("read"), Some(stored.clone()));
    assert_eq!(log.list().expect("list"), vec![stored]);
}
