//! Session transitions and action resolution.
//!
//! [`SessionMachine`] is the only writer of [`DuelSession`](crate::DuelSession)
//! state. It checks lifecycle and turn ownership, then hands the action to
//! [`CombatResolver`], which applies rolls, damage and status changes.
mod machine;
mod resolver;

pub use machine::{DuelProposal, SessionMachine, TurnReport};
pub use resolver::CombatResolver;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{DuelAction, OutcomeFlags};
    use crate::config::DuelConfig;
    use crate::env::{Catalog, ClassId, DuelEnv, PcgRng, RngOracle, TerrainId, derive_session_seed};
    use crate::error::{DuelError, ValidationError};
    use crate::state::{
        AbortReason, ActorId, CombatantSlot, DuelResult, DuelSession, Escrow, HoldId,
        HoldInstruction, RitualStatus, RitualVerdict, SessionId, SessionState, SettlementOutcome,
        SettlementPlan, StatusEffect, StatusEffectKind, Timestamp,
    };

    /// Rolls 100 on every d100: never crits, never misses unless chance is 100.
    struct SteadyRng;

    impl RngOracle for SteadyRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            99
        }
    }

    const ACCEPT_TIMEOUT: u64 = 60_000;

    fn alice() -> ActorId {
        ActorId::new("alice")
    }

    fn bob() -> ActorId {
        ActorId::new("bob")
    }

    fn proposal(terrain: &str, classes: (&str, &str)) -> DuelProposal {
        DuelProposal {
            challenger: alice(),
            target: bob(),
            wager: 100,
            terrain: TerrainId::new(terrain),
            challenger_class: ClassId::new(classes.0),
            target_class: ClassId::new(classes.1),
        }
    }

    fn escrow() -> Escrow {
        Escrow {
            challenger_hold: HoldId(1),
            target_hold: HoldId(2),
            amount_each: 100,
        }
    }

    fn started(terrain: &str, classes: (&str, &str), config: &DuelConfig) -> DuelSession {
        let catalog = Catalog::builtin();
        let mut session = SessionMachine::propose(
            proposal(terrain, classes),
            config,
            &catalog,
            SessionId(1),
            Timestamp::ZERO,
            derive_session_seed(SessionId(1), 7),
        )
        .expect("valid proposal");
        SessionMachine::new(&mut session)
            .accept(&bob(), Timestamp(10), ACCEPT_TIMEOUT, escrow())
            .expect("accept");
        session
    }

    #[test]
    fn propose_rejects_bad_payloads() {
        let config = DuelConfig::default();
        let catalog = Catalog::builtin();
        let propose = |p: DuelProposal| {
            SessionMachine::propose(p, &config, &catalog, SessionId(1), Timestamp::ZERO, 0)
        };

        let mut low = proposal("arena", ("warrior", "mage"));
        low.wager = 1;
        assert!(matches!(
            propose(low),
            Err(DuelError::Validation(ValidationError::WagerBelowMinimum { .. }))
        ));

        let mut selfie = proposal("arena", ("warrior", "mage"));
        selfie.target = alice();
        assert_eq!(
            propose(selfie),
            Err(DuelError::Validation(ValidationError::SelfChallenge))
        );

        assert!(matches!(
            propose(proposal("moon", ("warrior", "mage"))),
            Err(DuelError::Validation(ValidationError::UnknownTerrain(_)))
        ));
        assert!(matches!(
            propose(proposal("arena", ("warrior", "bard"))),
            Err(DuelError::Validation(ValidationError::UnknownClass(_)))
        ));
    }

    #[test]
    fn accept_checks_actor_and_deadline() {
        let config = DuelConfig::default();
        let catalog = Catalog::builtin();
        let mut session = SessionMachine::propose(
            proposal("arena", ("warrior", "mage")),
            &config,
            &catalog,
            SessionId(3),
            Timestamp(1_000),
            0,
        )
        .expect("valid proposal");
        let mut machine = SessionMachine::new(&mut session);

        assert_eq!(
            machine.check_accept(&alice(), Timestamp(1_001), ACCEPT_TIMEOUT),
            Err(DuelError::NotAuthorized { actor: alice() })
        );
        assert_eq!(
            machine.check_accept(&bob(), Timestamp(61_000), ACCEPT_TIMEOUT),
            Err(DuelError::AlreadyExpired {
                session: SessionId(3)
            })
        );
        assert!(machine.expire());
        assert!(!machine.expire());
        assert_eq!(
            machine.accept(&bob(), Timestamp(1_001), ACCEPT_TIMEOUT, escrow()),
            Err(DuelError::AlreadyExpired {
                session: SessionId(3)
            })
        );
        assert_eq!(session.state, SessionState::Expired);
        assert!(session.escrow.is_none());
    }

    #[test]
    fn accept_starts_with_challenger() {
        let session = started("arena", ("warrior", "mage"), &DuelConfig::default());
        assert_eq!(session.state, SessionState::InProgress);
        assert_eq!(session.turn_owner, CombatantSlot::Challenger);
        assert_eq!(session.escrowed(), 200);
    }

    #[test]
    fn turn_owner_alternates() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warrior", "warrior"), &config);
        let rng = PcgRng;
        let env = DuelEnv::new(&config, &rng);

        let mut expected = alice();
        for turn in 0..6 {
            let actor = session.turn_owner_id().clone();
            assert_eq!(actor, expected);
            let report = SessionMachine::new(&mut session)
                .submit_action(&actor, &DuelAction::BasicAttack, Timestamp(100 + turn), env)
                .expect("action resolves");
            assert!(!report.outcome.grants_extra_turn());
            expected = if expected == alice() { bob() } else { alice() };
            assert_eq!(report.turn_owner, expected);
        }
        assert_eq!(session.turn_index, 6);
    }

    #[test]
    fn not_your_turn_leaves_session_unchanged() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warrior", "mage"), &config);
        let before = session.clone();
        let rng = PcgRng;

        let err = SessionMachine::new(&mut session)
            .submit_action(
                &bob(),
                &DuelAction::BasicAttack,
                Timestamp(20),
                DuelEnv::new(&config, &rng),
            )
            .unwrap_err();
        assert_eq!(
            err,
            DuelError::NotYourTurn {
                actor: bob(),
                turn_owner: alice()
            }
        );
        assert_eq!(session, before);
    }

    #[test]
    fn special_on_cooldown_is_rejected_without_change() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warrior", "mage"), &config);
        let ability = session.challenger.class.special.id.clone();
        session.challenger.cooldowns.start(ability.clone(), 2);
        let before = session.clone();
        let rng = PcgRng;

        let err = SessionMachine::new(&mut session)
            .submit_action(
                &alice(),
                &DuelAction::ClassSpecial,
                Timestamp(20),
                DuelEnv::new(&config, &rng),
            )
            .unwrap_err();
        assert_eq!(
            err,
            DuelError::AbilityOnCooldown {
                ability: ability.clone(),
                remaining: 2
            }
        );
        assert_eq!(session, before);
        assert_eq!(session.challenger.cooldowns.remaining(&ability), 2);
    }

    #[test]
    fn special_cooldown_blocks_following_own_turns() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warrior", "mage"), &config);
        let rng = SteadyRng;
        let env = DuelEnv::new(&config, &rng);
        let ability = session.challenger.class.special.id.clone();
        let cooldown = session.challenger.class.special.cooldown;

        let report = SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::ClassSpecial, Timestamp(20), env)
            .expect("special resolves");
        assert!(report.outcome.flags.contains(OutcomeFlags::SPECIAL_USED));
        assert_eq!(session.challenger.cooldowns.remaining(&ability), cooldown);
        assert!(session.challenger.status_effects.has(StatusEffectKind::SpecialActive));
    }

    #[test]
    fn boosted_attack_validates_cost_before_spending() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warrior", "mage"), &config);
        let rng = SteadyRng;
        let env = DuelEnv::new(&config, &rng);

        let err = SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::BoostedAttack { cost: 0 }, Timestamp(20), env)
            .unwrap_err();
        assert!(matches!(
            err,
            DuelError::Validation(ValidationError::InvalidBoostCost { .. })
        ));

        let err = SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::BoostedAttack { cost: 4 }, Timestamp(20), env)
            .unwrap_err();
        assert_eq!(
            err,
            DuelError::InsufficientResources {
                required: 4,
                available: 3
            }
        );
        assert_eq!(session.challenger.resources, 3);

        let report = SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::BoostedAttack { cost: 2 }, Timestamp(20), env)
            .expect("boost resolves");
        // base 12 * (150 + warrior 10)% = 19
        assert_eq!(report.outcome.damage_dealt, 19);
        assert_eq!(report.outcome.resources_spent, 2);
        assert_eq!(session.challenger.resources, 3 - 2 + config.resources_per_turn);
    }

    #[test]
    fn defend_mitigates_next_hit() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warrior", "warrior"), &config);
        let rng = SteadyRng;
        let env = DuelEnv::new(&config, &rng);

        SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::Defend, Timestamp(20), env)
            .expect("defend resolves");
        assert_eq!(
            session.challenger.status_effects.get(StatusEffectKind::Defense),
            Some(config.defend_bonus)
        );
        let report = SessionMachine::new(&mut session)
            .submit_action(&bob(), &DuelAction::BasicAttack, Timestamp(30), env)
            .expect("attack resolves");
        // 12 * 110% = 13, then * 70% = 9
        assert_eq!(report.outcome.damage_dealt, 9);
    }

    #[test]
    fn extra_turn_keeps_the_turn_once() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("rogue", "warrior"), &config);
        let rng = SteadyRng;
        let env = DuelEnv::new(&config, &rng);

        let report = SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::ClassSpecial, Timestamp(20), env)
            .expect("special resolves");
        assert!(report.outcome.grants_extra_turn());
        assert_eq!(report.turn_owner, alice());

        let report = SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::BasicAttack, Timestamp(30), env)
            .expect("attack resolves");
        assert!(!report.outcome.grants_extra_turn());
        assert_eq!(report.turn_owner, bob());
    }

    #[test]
    fn arcane_surge_boosts_the_extra_turn_attack() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("mage", "mage"), &config);
        let rng = SteadyRng;
        let env = DuelEnv::new(&config, &rng);

        let report = SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::ClassSpecial, Timestamp(20), env)
            .expect("surge resolves");
        assert_eq!(report.turn_owner, alice());
        assert_eq!(
            session.challenger.status_effects.get(StatusEffectKind::SpecialActive),
            Some(40)
        );
        assert!(!session.challenger.status_effects.has(StatusEffectKind::ExtraTurn));

        let report = SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::BasicAttack, Timestamp(30), env)
            .expect("attack resolves");
        // 12 * 140% = 16
        assert_eq!(report.outcome.damage_dealt, 16);
        assert!(!session.challenger.status_effects.has(StatusEffectKind::SpecialActive));
    }

    #[test]
    fn special_buff_covers_as_many_own_turns_as_granted() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warrior", "warrior"), &config);
        let rng = SteadyRng;
        let env = DuelEnv::new(&config, &rng);
        let turns = |session: &DuelSession| {
            session
                .challenger
                .status_effects
                .remaining_turns(StatusEffectKind::SpecialActive)
        };

        SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::ClassSpecial, Timestamp(20), env)
            .expect("special resolves");
        assert_eq!(turns(&session), Some(2));

        for (at, expected) in [(30, Some(1)), (50, None)] {
            SessionMachine::new(&mut session)
                .submit_action(&bob(), &DuelAction::Defend, Timestamp(at), env)
                .expect("bob defends");
            let report = SessionMachine::new(&mut session)
                .submit_action(&alice(), &DuelAction::BasicAttack, Timestamp(at + 10), env)
                .expect("alice attacks");
            assert!(report.outcome.damage_dealt > 0);
            assert_eq!(turns(&session), expected);
        }
    }

    #[test]
    fn oversized_boost_rate_saturates_instead_of_overflowing() {
        let config = DuelConfig {
            boost_pct_per_resource: u32::MAX,
            ..DuelConfig::default()
        };
        let mut session = started("arena", ("warrior", "warrior"), &config);
        let rng = SteadyRng;
        let env = DuelEnv::new(&config, &rng);

        let report = SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::BoostedAttack { cost: 2 }, Timestamp(20), env)
            .expect("boost resolves");
        assert_eq!(report.outcome.damage_dealt, config.max_hp);
        assert_eq!(
            report.result,
            Some(DuelResult::Victory {
                winner: CombatantSlot::Challenger
            })
        );
    }

    #[test]
    fn counter_reflects_part_of_the_damage() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warrior", "warrior"), &config);
        session
            .target
            .status_effects
            .apply(StatusEffect::new(StatusEffectKind::CounterChance, 100, 2));
        let rng = SteadyRng;

        let report = SessionMachine::new(&mut session)
            .submit_action(
                &alice(),
                &DuelAction::BasicAttack,
                Timestamp(20),
                DuelEnv::new(&config, &rng),
            )
            .expect("attack resolves");
        assert!(report.outcome.flags.contains(OutcomeFlags::COUNTERED));
        assert_eq!(report.outcome.damage_dealt, 13);
        assert_eq!(report.outcome.counter_damage, 6);
        assert_eq!(session.challenger.hit_points.current(), 94);
    }

    #[test]
    fn high_risk_strike_can_end_in_mutual_loss() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warrior", "warrior"), &config);
        session.challenger.hit_points.damage(90);
        session.target.hit_points.damage(90);
        session.challenger.status_effects.apply(StatusEffect::new(
            StatusEffectKind::Defense,
            50,
            2,
        ));
        let rng = SteadyRng;

        let report = SessionMachine::new(&mut session)
            .submit_action(
                &alice(),
                &DuelAction::HighRiskStrike,
                Timestamp(20),
                DuelEnv::new(&config, &rng),
            )
            .expect("strike resolves");
        assert_eq!(report.result, Some(DuelResult::MutualLoss));
        assert_eq!(session.state, SessionState::Resolved);
        assert_eq!(session.challenger.hit_points.current(), 0);
        assert_eq!(session.target.hit_points.current(), 0);

        let plan = SettlementPlan::for_session(&session).expect("resolved owes settlement");
        assert_eq!(plan.outcome, SettlementOutcome::Refund);
        assert_eq!(plan.refunded, 200);
        assert!(plan
            .instructions
            .iter()
            .all(|i| matches!(i, HoldInstruction::Release { .. })));
    }

    #[test]
    fn victory_commits_both_holds_to_winner() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warrior", "warrior"), &config);
        session.target.hit_points.damage(95);
        let rng = SteadyRng;

        let report = SessionMachine::new(&mut session)
            .submit_action(
                &alice(),
                &DuelAction::BasicAttack,
                Timestamp(20),
                DuelEnv::new(&config, &rng),
            )
            .expect("attack resolves");
        assert_eq!(
            report.result,
            Some(DuelResult::Victory {
                winner: CombatantSlot::Challenger
            })
        );
        assert_eq!(session.winner(), Some(&alice()));

        let plan = SettlementPlan::for_session(&session).expect("resolved owes settlement");
        assert_eq!(plan.outcome, SettlementOutcome::Victory);
        assert_eq!(plan.payout, 200);
        assert_eq!(plan.loser, Some(bob()));
        assert_eq!(plan.instructions.len(), 2);
        assert!(plan.instructions.iter().all(
            |i| matches!(i, HoldInstruction::Commit { destination, .. } if destination == &alice())
        ));

        assert_eq!(
            SessionMachine::new(&mut session).submit_action(
                &bob(),
                &DuelAction::BasicAttack,
                Timestamp(30),
                DuelEnv::new(&config, &rng),
            ),
            Err(DuelError::SessionNotActive {
                state: SessionState::Resolved
            })
        );
    }

    #[test]
    fn hp_stays_within_bounds_over_a_full_duel() {
        let config = DuelConfig::default();
        let mut session = started("volcano", ("cleric", "warlock"), &config);
        let rng = PcgRng;
        let env = DuelEnv::new(&config, &rng);
        let actions = [
            DuelAction::BasicAttack,
            DuelAction::ClassSpecial,
            DuelAction::HighRiskStrike,
            DuelAction::Defend,
            DuelAction::BoostedAttack { cost: 1 },
        ];

        let mut turn = 0u64;
        while session.state == SessionState::InProgress && turn < 200 {
            let actor = session.turn_owner_id().clone();
            let action = &actions[(turn as usize) % actions.len()];
            if let Ok(report) =
                SessionMachine::new(&mut session).submit_action(&actor, action, Timestamp(turn), env)
            {
                for hp in [report.outcome.actor_hp, report.outcome.opponent_hp] {
                    assert!(hp.after <= config.max_hp);
                }
            } else {
                SessionMachine::new(&mut session)
                    .submit_action(&actor, &DuelAction::BasicAttack, Timestamp(turn), env)
                    .expect("basic attack always resolves");
            }
            turn += 1;
        }
        assert_eq!(session.state, SessionState::Resolved);
    }

    #[test]
    fn terrain_event_fires_once_per_session() {
        let config = DuelConfig::default();
        let mut session = started("tundra", ("warrior", "warrior"), &config);
        session.challenger.hit_points.damage(80);
        let rng = SteadyRng;
        let env = DuelEnv::new(&config, &rng);

        let report = SessionMachine::new(&mut session)
            .submit_action(&alice(), &DuelAction::Defend, Timestamp(20), env)
            .expect("defend resolves");
        assert!(report.outcome.flags.contains(OutcomeFlags::SPECIAL_EVENT));
        assert!(session.special_event_fired);
        assert_eq!(session.challenger.hit_points.current(), 28);
        assert_eq!(session.target.hit_points.current(), config.max_hp);

        let report = SessionMachine::new(&mut session)
            .submit_action(&bob(), &DuelAction::Defend, Timestamp(30), env)
            .expect("defend resolves");
        assert!(!report.outcome.flags.contains(OutcomeFlags::SPECIAL_EVENT));
        assert_eq!(session.challenger.hit_points.current(), 28);
    }

    #[test]
    fn fixed_seed_replays_identically() {
        let config = DuelConfig::default();
        let rng = PcgRng;
        let env = DuelEnv::new(&config, &rng);
        let play = || {
            let mut session = started("arena", ("warrior", "warrior"), &config);
            let mut deltas = Vec::new();
            for turn in 0..8 {
                let actor = session.turn_owner_id().clone();
                let report = SessionMachine::new(&mut session)
                    .submit_action(&actor, &DuelAction::BasicAttack, Timestamp(turn), env)
                    .expect("attack resolves");
                deltas.push(report.outcome.opponent_hp.delta());
            }
            deltas
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn ritual_lifecycle() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warlock", "warrior"), &config);
        let rng = SteadyRng;
        let env = DuelEnv::new(&config, &rng);
        let carol = ActorId::new("carol");

        let err = SessionMachine::new(&mut session)
            .submit_action(
                &alice(),
                &DuelAction::SideRitual {
                    target: bob(),
                    cost: 2,
                },
                Timestamp(20),
                env,
            )
            .unwrap_err();
        assert_eq!(
            err,
            DuelError::Validation(ValidationError::RitualTargetIsCombatant(bob()))
        );

        let report = SessionMachine::new(&mut session)
            .submit_action(
                &alice(),
                &DuelAction::SideRitual {
                    target: carol.clone(),
                    cost: 2,
                },
                Timestamp(20),
                env,
            )
            .expect("ritual starts");
        let ritual = report.ritual_started.expect("ritual id");
        assert!(report.outcome.flags.contains(OutcomeFlags::RITUAL_PENDING));

        let mut machine = SessionMachine::new(&mut session);
        assert_eq!(
            machine.resolve_ritual(ritual, RitualVerdict::Submit, Some(&bob()), &config),
            Err(DuelError::NotAuthorized { actor: bob() })
        );
        let resolution = machine
            .resolve_ritual(ritual, RitualVerdict::TimedOut, None, &config)
            .expect("resolves")
            .expect("first resolution applies");
        assert!(resolution.succeeded);
        assert_eq!(resolution.penalty, config.ritual.penalty);
        assert_eq!(resolution.target, carol);
        assert_eq!(
            machine.resolve_ritual(ritual, RitualVerdict::Resist, Some(&carol), &config),
            Ok(None)
        );

        assert_eq!(
            session.challenger.status_effects.get(StatusEffectKind::Divine),
            Some(config.ritual.buff_pct)
        );
        assert_eq!(
            session.ritual(ritual).map(|r| r.status),
            Some(RitualStatus::Succeeded)
        );
    }

    #[test]
    fn resisted_ritual_backfires_and_abort_cancels_pending() {
        let config = DuelConfig::default();
        let mut session = started("arena", ("warlock", "warrior"), &config);
        let rng = SteadyRng;
        let env = DuelEnv::new(&config, &rng);
        let carol = ActorId::new("carol");
        let ritual_action = DuelAction::SideRitual {
            target: carol.clone(),
            cost: 2,
        };

        let first = SessionMachine::new(&mut session)
            .submit_action(&alice(), &ritual_action, Timestamp(20), env)
            .expect("ritual starts")
            .ritual_started
            .expect("ritual id");
        SessionMachine::new(&mut session)
            .resolve_ritual(first, RitualVerdict::Resist, Some(&carol), &config)
            .expect("resolves");
        assert!(session.challenger.status_effects.has(StatusEffectKind::Curse));

        let second = SessionMachine::new(&mut session)
            .submit_action(&bob(), &ritual_action, Timestamp(30), env)
            .expect("ritual starts")
            .ritual_started
            .expect("ritual id");

        let mut machine = SessionMachine::new(&mut session);
        assert!(machine.abort(AbortReason::Cancelled));
        assert!(!machine.abort(AbortReason::TurnTimeout));
        assert_eq!(
            machine.resolve_ritual(second, RitualVerdict::TimedOut, None, &config),
            Ok(None)
        );
        assert_eq!(
            session.ritual(second).map(|r| r.status),
            Some(RitualStatus::Cancelled)
        );
        assert_eq!(session.abort_reason, Some(AbortReason::Cancelled));

        let plan = SettlementPlan::for_session(&session).expect("aborted owes refund");
        assert_eq!(plan.outcome, SettlementOutcome::Refund);
        assert_eq!(plan.refunded, 200);
    }
}
