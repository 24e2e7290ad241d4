//! Applies one action to a session.
//!
//! Resolution order:
//!
//! 1. validate the payload against resources, cooldowns and ritual rules
//! 2. deduct the resource cost
//! 3. run the action (attack rolls, defend, class special, ritual start)
//! 4. check the terrain's one-shot special event
//! 5. consume `ExtraTurn` if the actor carries it or its special grants it
//! 6. end-of-turn housekeeping on the actor, then the special's status grants
//!    so an N-turn self-buff covers the actor's next N turns
//!
//! Validation happens before anything is written, so a rejected action
//! leaves the session untouched.

use crate::action::{ActionOutcome, DuelAction, HpChange, OutcomeFlags};
use crate::combat::{
    AttackOutcome, DamageInput, RollSeed, calculate_damage, check_chance, counter_damage,
    critical_chance, miss_chance, roll_attack, roll_counter,
};
use crate::env::{
    AbilityId, DuelEnv, EventEffect, EventTrigger, ROLL_TERRAIN_EVENT, SpecialEffect,
};
use crate::error::{DuelError, ValidationError};
use crate::state::{
    CombatantSlot, DuelSession, PendingRitual, RitualId, RitualStatus, StatusEffect,
    StatusEffectKind, Timestamp,
};

/// Stateless action resolver bound to one environment.
#[derive(Clone, Copy, Debug)]
pub struct CombatResolver<'a> {
    env: DuelEnv<'a>,
}

/// Mutable scratch for one resolution.
struct Resolution {
    outcome: ActionOutcome,
    fresh_cooldown: Option<(AbilityId, u8)>,
    /// Status grants of a special used this action, applied after the tick.
    fresh_grants: Option<SpecialEffect>,
    extra_turn_granted: bool,
}

impl<'a> CombatResolver<'a> {
    pub fn new(env: DuelEnv<'a>) -> Self {
        Self { env }
    }

    /// Resolves `action` for the combatant in `actor`.
    ///
    /// Turn ownership and lifecycle checks belong to the session machine;
    /// this only enforces payload, resource and cooldown rules.
    pub fn resolve(
        &self,
        session: &mut DuelSession,
        actor: CombatantSlot,
        action: &DuelAction,
        now: Timestamp,
    ) -> Result<ActionOutcome, DuelError> {
        self.validate(session, actor, action)?;

        let cost = action.resource_cost();
        let before_actor = session.combatant(actor).hit_points.current();
        let before_opponent = session.combatant(actor.opponent()).hit_points.current();

        session
            .combatant_mut(actor)
            .spend(cost)
            .map_err(|available| DuelError::InsufficientResources {
                required: cost,
                available,
            })?;

        let mut res = Resolution {
            outcome: ActionOutcome {
                turn_index: session.turn_index,
                actor: session.combatant(actor).identity.clone(),
                action: action.clone(),
                damage_dealt: 0,
                self_damage: 0,
                counter_damage: 0,
                healed: 0,
                resources_spent: cost,
                flags: OutcomeFlags::empty(),
                actor_hp: HpChange::default(),
                opponent_hp: HpChange::default(),
                ritual: None,
                narrative: Vec::new(),
            },
            fresh_cooldown: None,
            fresh_grants: None,
            extra_turn_granted: false,
        };

        match action {
            DuelAction::BasicAttack => self.attack(session, actor, 100, false, &mut res),
            DuelAction::BoostedAttack { cost } => {
                let multiplier = cost
                    .saturating_mul(self.env.config().boost_pct_per_resource)
                    .saturating_add(100);
                self.attack(session, actor, multiplier, false, &mut res)
            }
            DuelAction::HighRiskStrike => self.attack(session, actor, 100, true, &mut res),
            DuelAction::Defend => self.defend(session, actor, &mut res),
            DuelAction::ClassSpecial => self.class_special(session, actor, &mut res),
            DuelAction::SideRitual { target, cost } => {
                let id = RitualId(session.next_ritual_id);
                session.next_ritual_id += 1;
                session.rituals.push(PendingRitual {
                    id,
                    initiator: actor,
                    target: target.clone(),
                    cost: *cost,
                    started_turn: session.turn_index,
                    started_at: now,
                    status: RitualStatus::Pending,
                    penalty_collected: 0,
                });
                res.outcome.ritual = Some(id);
                res.outcome.flags |= OutcomeFlags::RITUAL_PENDING;
                res.outcome.narrative.push(format!(
                    "{} begins a ritual against {}.",
                    res.outcome.actor, target
                ));
            }
        }

        self.special_event(session, actor, &mut res);

        let duel_over = session.challenger.is_defeated() || session.target.is_defeated();
        let fighter = session.combatant_mut(actor);
        let carried = fighter.status_effects.remove(StatusEffectKind::ExtraTurn).is_some();
        if !duel_over && (carried || res.extra_turn_granted) {
            res.outcome.flags |= OutcomeFlags::EXTRA_TURN;
            res.outcome
                .narrative
                .push(format!("{} acts again.", res.outcome.actor));
        }

        self.end_of_turn(session, actor, &mut res);

        res.outcome.actor_hp = HpChange {
            before: before_actor,
            after: session.combatant(actor).hit_points.current(),
        };
        res.outcome.opponent_hp = HpChange {
            before: before_opponent,
            after: session.combatant(actor.opponent()).hit_points.current(),
        };
        Ok(res.outcome)
    }

    fn validate(
        &self,
        session: &DuelSession,
        actor: CombatantSlot,
        action: &DuelAction,
    ) -> Result<(), DuelError> {
        let config = self.env.config();
        let fighter = session.combatant(actor);

        match action {
            DuelAction::BoostedAttack { cost } => {
                if *cost == 0 || *cost > config.max_boost_cost {
                    return Err(ValidationError::InvalidBoostCost {
                        cost: *cost,
                        max: config.max_boost_cost,
                    }
                    .into());
                }
            }
            DuelAction::ClassSpecial => {
                let ability = &fighter.class.special.id;
                let remaining = fighter.cooldowns.remaining(ability);
                if remaining > 0 {
                    return Err(DuelError::AbilityOnCooldown {
                        ability: ability.clone(),
                        remaining,
                    });
                }
            }
            DuelAction::SideRitual { target, cost } => {
                if *cost < config.ritual.min_cost {
                    return Err(ValidationError::RitualCostTooLow {
                        cost: *cost,
                        minimum: config.ritual.min_cost,
                    }
                    .into());
                }
                if session.slot_of(target).is_some() {
                    return Err(ValidationError::RitualTargetIsCombatant(target.clone()).into());
                }
                if session.pending_rituals().any(|r| r.initiator == actor) {
                    return Err(ValidationError::RitualAlreadyPending.into());
                }
            }
            DuelAction::BasicAttack | DuelAction::Defend | DuelAction::HighRiskStrike => {}
        }

        let cost = action.resource_cost();
        if fighter.resources < cost {
            return Err(DuelError::InsufficientResources {
                required: cost,
                available: fighter.resources,
            });
        }
        Ok(())
    }

    fn roll_seed(session: &DuelSession, actor: CombatantSlot) -> RollSeed {
        RollSeed {
            session_seed: session.seed,
            nonce: session.turn_index as u64,
            slot: actor.index(),
        }
    }

    fn attack(
        &self,
        session: &mut DuelSession,
        actor: CombatantSlot,
        action_pct: u32,
        high_risk: bool,
        res: &mut Resolution,
    ) {
        let config = self.env.config();
        let rng = self.env.rng();
        let seed = Self::roll_seed(session, actor);
        let terrain = session.terrain.clone();

        let (crit, miss, multiplier, defense) = {
            let attacker = session.combatant(actor);
            let defender = session.combatant(actor.opponent());
            let multiplier = (action_pct as i64 + attacker.attack_bonus_pct())
                .clamp(0, u32::MAX as i64) as u32;
            (
                critical_chance(attacker, &terrain, config),
                miss_chance(attacker, defender, &terrain, config),
                multiplier,
                defender.defense(&terrain, config.defense_cap),
            )
        };

        let result = roll_attack(seed, crit, miss, rng);
        let actor_name = res.outcome.actor.clone();
        let (attacker, defender) = session.pair_mut(actor);

        if result == AttackOutcome::Miss {
            res.outcome.flags |= OutcomeFlags::MISS;
            res.outcome
                .narrative
                .push(format!("{actor_name} misses {}.", defender.identity));
            return;
        }

        let critical = result == AttackOutcome::Critical;
        if critical {
            res.outcome.flags |= OutcomeFlags::CRITICAL;
        }
        let damage = calculate_damage(
            &DamageInput {
                base: if high_risk {
                    config.high_risk_damage
                } else {
                    config.base_damage
                },
                multiplier_pct: multiplier,
                critical,
                defense,
                ignore_defense: high_risk,
                fire_pct: terrain.modifiers.fire,
            },
            config,
        );

        let dealt = defender.hit_points.damage(damage);
        res.outcome.damage_dealt = dealt;
        res.outcome.narrative.push(format!(
            "{actor_name} {} {} for {dealt} damage.",
            if critical { "critically strikes" } else { "hits" },
            defender.identity
        ));

        if high_risk {
            res.outcome.self_damage = attacker.hit_points.damage(damage);
            res.outcome.narrative.push(format!(
                "The reckless strike costs {actor_name} {} HP.",
                res.outcome.self_damage
            ));
        }

        if defender.is_defeated() {
            return;
        }
        let Some(counter_chance) = defender.status_effects.get(StatusEffectKind::CounterChance)
        else {
            return;
        };
        if roll_counter(seed, counter_chance, rng) {
            let reflected = counter_damage(dealt, config.counter_ratio_pct);
            res.outcome.counter_damage = attacker.hit_points.damage(reflected);
            res.outcome.flags |= OutcomeFlags::COUNTERED;
            res.outcome.narrative.push(format!(
                "{} counters for {} damage.",
                defender.identity, res.outcome.counter_damage
            ));
        }
    }

    fn defend(&self, session: &mut DuelSession, actor: CombatantSlot, res: &mut Resolution) {
        let config = self.env.config();
        let fighter = session.combatant_mut(actor);
        let applied = fighter.status_effects.apply_capped(
            StatusEffect::new(
                StatusEffectKind::Defense,
                config.defend_bonus,
                config.defend_duration,
            ),
            Some(config.defense_cap),
        );
        res.outcome.flags |= OutcomeFlags::DEFENDED;
        let magnitude = applied.map_or(0, |e| e.magnitude);
        res.outcome.narrative.push(format!(
            "{} braces, defense now {magnitude}%.",
            res.outcome.actor
        ));
    }

    fn class_special(&self, session: &mut DuelSession, actor: CombatantSlot, res: &mut Resolution) {
        let fighter = session.combatant_mut(actor);
        let special = fighter.class.special.clone();

        res.outcome.healed += fighter.hit_points.heal(special.effect.heal);
        res.extra_turn_granted = special.effect.grants_extra_turn();
        res.fresh_grants = Some(special.effect.without_extra_turn());
        res.fresh_cooldown = Some((special.id, special.cooldown));
        res.outcome.flags |= OutcomeFlags::SPECIAL_USED;
        res.outcome
            .narrative
            .push(format!("{} uses {}.", res.outcome.actor, special.name));
    }

    fn special_event(&self, session: &mut DuelSession, actor: CombatantSlot, res: &mut Resolution) {
        if session.special_event_fired
            || session.challenger.is_defeated()
            || session.target.is_defeated()
        {
            return;
        }
        let Some(event) = session.terrain.special_event.clone() else {
            return;
        };

        let triggered = match event.trigger {
            EventTrigger::OnTurn(turn) => session.turn_index == turn,
            EventTrigger::HpBelowPercent(pct) => {
                session.challenger.hit_points.percent() < pct
                    || session.target.hit_points.percent() < pct
            }
            EventTrigger::Chance(pct) => {
                let roll = Self::roll_seed(session, actor).roll(self.env.rng(), ROLL_TERRAIN_EVENT);
                check_chance(pct, roll)
            }
        };
        if !triggered {
            return;
        }

        session.special_event_fired = true;
        res.outcome.flags |= OutcomeFlags::SPECIAL_EVENT;
        res.outcome.narrative.push(event.narrative.clone());

        match event.effect {
            EventEffect::DamageBoth(amount) => {
                let (acting, other) = session.pair_mut(actor);
                res.outcome.self_damage += acting.hit_points.damage(amount);
                res.outcome.damage_dealt += other.hit_points.damage(amount);
            }
            EventEffect::HealBoth(amount) => {
                let (acting, other) = session.pair_mut(actor);
                res.outcome.healed += acting.hit_points.heal(amount);
                other.hit_points.heal(amount);
            }
            EventEffect::CurseActor { magnitude, turns } => {
                session
                    .combatant_mut(actor)
                    .status_effects
                    .apply(StatusEffect::new(StatusEffectKind::Curse, magnitude, turns));
            }
            EventEffect::GrantResources(amount) => {
                session.challenger.resources += amount;
                session.target.resources += amount;
            }
        }
    }

    fn end_of_turn(&self, session: &mut DuelSession, actor: CombatantSlot, res: &mut Resolution) {
        let config = self.env.config();
        let fighter = session.combatant_mut(actor);

        if !fighter.is_defeated() {
            let regen = fighter.class.passive.regeneration
                + fighter
                    .status_effects
                    .get(StatusEffectKind::Regeneration)
                    .unwrap_or(0);
            res.outcome.healed += fighter.hit_points.heal(regen);
        }

        fighter.cooldowns.tick();
        if let Some((ability, turns)) = res.fresh_cooldown.take() {
            fighter.cooldowns.start(ability, turns);
        }
        fighter.status_effects.tick();
        if let Some(effect) = res.fresh_grants.take() {
            effect.grant_statuses(fighter, config.defense_cap);
        }
        fighter.resources += config.resources_per_turn;
    }
}
