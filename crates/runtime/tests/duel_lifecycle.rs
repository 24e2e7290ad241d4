//! End-to-end duel flows through `DuelHandle`.

mod common;

use std::sync::Arc;

use common::*;
use duel_core::{
    DuelAction, DuelError, DuelResult, CombatantSlot, PcgRng, SessionState, SettlementOutcome,
    ValidationError,
};
use duel_runtime::{
    BasicAttackProvider, DuelRuntime, InMemoryLedger, RuntimeConfig, RuntimeError,
};

/// Two warriors on the arena, basic attacks only: the same seed yields
/// the same duel.
#[tokio::test]
async fn fixed_seed_replays_the_same_duel() {
    async fn play(entropy: u64) -> duel_core::DuelSession {
        let ledger = Arc::new(InMemoryLedger::with_balances([("alice", 500), ("bob", 500)]));
        let runtime = DuelRuntime::builder()
            .rng(Arc::new(PcgRng))
            .ledger(ledger)
            .default_provider(BasicAttackProvider)
            .seed(entropy)
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
        runtime.shutdown().await.expect("shutdown");
        finished
    }

    let first = play(42).await;
    let second = play(42).await;

    assert_eq!(first.state, SessionState::Resolved);
    assert_eq!(first.seed, second.seed);
    assert_eq!(first.turn_index, second.turn_index);
    assert_eq!(first.result, second.result);
    assert_eq!(first.challenger.hit_points, second.challenger.hit_points);
    assert_eq!(first.target.hit_points, second.target.hit_points);
}

#[tokio::test]
async fn proposal_beyond_balance_creates_nothing() {
    let h = harness(RuntimeConfig::default()).await;
    h.ledger.deposit("dave", 400);

    let err = h
        .handle
        .propose_duel(proposal(duel_core::ActorId::new("dave"), bob(), 500))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Duel(DuelError::InsufficientFunds {
            required: 500,
            available: 400,
            ..
        })
    ));
    assert_eq!(h.handle.active_sessions(), 0);
    assert_eq!(h.handle.engaged_in(&bob()), None);
}

#[tokio::test]
async fn acting_out_of_turn_changes_nothing() {
    let h = harness(RuntimeConfig::default()).await;
    let id = h.start_duel(100).await;
    let before = h.handle.snapshot(id).await.expect("snapshot");

    let err = h
        .handle
        .submit_action(id, &bob(), DuelAction::BasicAttack)
        .await
        .unwrap_err();

    assert!(matches!(err, RuntimeError::Duel(DuelError::NotYourTurn { .. })));
    assert_eq!(h.handle.snapshot(id).await.expect("snapshot"), before);
}

#[tokio::test]
async fn special_on_cooldown_is_rejected_and_cooldown_kept() {
    let h = harness(RuntimeConfig::default()).await;
    let id = h.start_duel(100).await;

    h.handle
        .submit_action(id, &alice(), DuelAction::ClassSpecial)
        .await
        .expect("first special");
    h.handle
        .submit_action(id, &bob(), DuelAction::BasicAttack)
        .await
        .expect("bob attacks");

    let before = h.handle.snapshot(id).await.expect("snapshot");
    let ability = before.challenger.class.special.id.clone();
    let remaining = before.challenger.cooldowns.remaining(&ability);
    assert!(remaining > 0);

    let err = h
        .handle
        .submit_action(id, &alice(), DuelAction::ClassSpecial)
        .await
        .unwrap_err();

    assert_eq!(
        err.as_duel(),
        Some(&DuelError::AbilityOnCooldown {
            ability: ability.clone(),
            remaining,
        })
    );
    let after = h.handle.snapshot(id).await.expect("snapshot");
    assert_eq!(after.challenger.cooldowns.remaining(&ability), remaining);
    assert_eq!(after, before);
}

#[tokio::test]
async fn turn_owner_alternates_between_actions() {
    let h = harness(RuntimeConfig::default()).await;
    let id = h.start_duel(100).await;

    let mut expected = alice();
    for turn in 0..6u32 {
        let next = if expected == alice() { bob() } else { alice() };
        let report = h
            .handle
            .submit_action(id, &expected, DuelAction::BasicAttack)
            .await
            .expect("turn owner may act");
        assert_eq!(report.outcome.turn_index, turn);
        assert_eq!(report.turn_owner, next);
        expected = next;
    }
}

#[tokio::test]
async fn full_duel_pays_the_winner_and_archives_the_session() {
    let h = harness(RuntimeConfig::default()).await;
    let id = h.start_duel(100).await;
    assert_eq!(h.ledger.escrowed_total(), 200);

    let finished = h.runtime.run_to_completion(id).await.expect("duel finishes");

    // Alice strikes first and both deal the same damage, so she lands the
    // killing blow one turn earlier.
    assert_eq!(
        finished.result,
        Some(DuelResult::Victory {
            winner: CombatantSlot::Challenger,
        })
    );
    let hits_to_kill = 100u32.div_ceil(WARRIOR_HIT);
    assert_eq!(finished.turn_index, hits_to_kill * 2 - 1);
    assert!(finished.settled_at.is_some());

    assert_eq!(h.ledger.escrowed_total(), 0);
    assert_eq!(h.balance(&alice()), STARTING_BALANCE + 100);
    assert_eq!(h.balance(&bob()), STARTING_BALANCE - 100);

    let record = h.handle.settlement(id).expect("repo").expect("record");
    assert_eq!(record.outcome, SettlementOutcome::Victory);
    assert_eq!(record.winner, Some(alice()));
    assert_eq!(record.loser, Some(bob()));
    assert_eq!(record.payout, 200);

    assert_eq!(h.handle.active_sessions(), 0);
    assert_eq!(h.handle.engaged_in(&alice()), None);
    let err = h
        .handle
        .submit_action(id, &alice(), DuelAction::BasicAttack)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Duel(DuelError::SessionNotActive {
            state: SessionState::Resolved
        })
    ));
}

#[tokio::test]
async fn only_the_target_may_accept() {
    let h = harness(RuntimeConfig::default()).await;
    let id = h
        .handle
        .propose_duel(proposal(alice(), bob(), 100))
        .await
        .expect("proposal")
        .id;

    let err = h.handle.accept(id, &carol()).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Duel(DuelError::NotAuthorized { .. })));
    assert_eq!(h.ledger.escrowed_total(), 0);

    let started = h.handle.accept(id, &bob()).await.expect("bob accepts");
    assert_eq!(started.state, SessionState::InProgress);
    assert_eq!(started.turn_owner_id(), &alice());
}

#[tokio::test]
async fn engaged_actor_cannot_be_challenged_again() {
    let h = harness(RuntimeConfig::default()).await;
    h.start_duel(100).await;

    let err = h
        .handle
        .propose_duel(proposal(carol(), alice(), 100))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Duel(DuelError::Validation(
            ValidationError::ActorAlreadyEngaged { .. }
        ))
    ));
}

#[tokio::test]
async fn wager_below_minimum_is_a_validation_error() {
    let h = harness(RuntimeConfig::default()).await;

    let err = h
        .handle
        .propose_duel(proposal(alice(), bob(), 1))
        .await
        .unwrap_err();

    assert_eq!(err.category(), duel_core::ErrorCategory::Validation);
    assert!(!err.is_retryable());
    assert_eq!(h.handle.active_sessions(), 0);
}

#[tokio::test]
async fn abort_refunds_and_is_a_noop_afterwards() {
    let h = harness(RuntimeConfig::default()).await;
    let id = h.start_duel(100).await;

    let aborted = h
        .handle
        .abort(id, duel_core::AbortReason::Cancelled)
        .await
        .expect("abort");
    let again = h
        .handle
        .abort(id, duel_core::AbortReason::Cancelled)
        .await
        .expect("abort again");

    assert!(aborted);
    assert!(!again);
    assert_eq!(h.balance(&alice()), STARTING_BALANCE);
    assert_eq!(h.balance(&bob()), STARTING_BALANCE);
    let record = h.handle.settlement(id).expect("repo").expect("record");
    assert_eq!(record.outcome, SettlementOutcome::Refund);
    assert_eq!(record.refunded, 200);
    assert_eq!(h.repo.len(), 1);
}
