//! Heuristic combatant for unattended duels.
use async_trait::async_trait;
use duel_core::{ActorId, DuelAction, DuelConfig, DuelSession, StatusEffectKind};
use duel_runtime::{ActionProvider, Result, RuntimeError};

/// Picks an action from the visible session state.
///
/// Priorities, first match wins:
/// 1. finish a weak opponent with a high-risk strike it can survive
/// 2. start one ritual against the configured spectator
/// 3. defend when low and not already defending
/// 4. use the class special when ready
/// 5. spend spare resources on a boosted attack
/// 6. basic attack
#[derive(Clone, Debug)]
pub struct HeuristicBot {
    config: DuelConfig,
    spectator: Option<ActorId>,
    defend_below_pct: u32,
}

impl HeuristicBot {
    pub fn new(config: DuelConfig) -> Self {
        Self {
            config,
            spectator: None,
            defend_below_pct: 35,
        }
    }

    pub fn with_spectator(mut self, spectator: Option<ActorId>) -> Self {
        self.spectator = spectator;
        self
    }

    pub fn choose(&self, actor: &ActorId, session: &DuelSession) -> Option<DuelAction> {
        let slot = session.slot_of(actor)?;
        let me = session.combatant(slot);
        let foe = session.combatant(slot.opponent());

        let strike = self.config.high_risk_damage;
        if foe.hit_points.current() <= strike && me.hit_points.current() > strike {
            return Some(DuelAction::HighRiskStrike);
        }

        if let Some(spectator) = &self.spectator {
            let cost = self.config.ritual.min_cost;
            let ritual_used = session.rituals.iter().any(|r| r.initiator == slot);
            if !ritual_used && me.resources >= cost {
                return Some(DuelAction::SideRitual {
                    target: spectator.clone(),
                    cost,
                });
            }
        }

        if me.hit_points.percent() < self.defend_below_pct
            && !me.status_effects.has(StatusEffectKind::Defense)
        {
            return Some(DuelAction::Defend);
        }

        if me.cooldowns.is_ready(&me.class.special.id) {
            return Some(DuelAction::ClassSpecial);
        }

        let spare = me.resources.min(self.config.max_boost_cost);
        if spare >= 2 {
            return Some(DuelAction::BoostedAttack { cost: spare });
        }

        Some(DuelAction::BasicAttack)
    }
}

#[async_trait]
impl ActionProvider for HeuristicBot {
    async fn provide_action(&self, actor: &ActorId, session: &DuelSession) -> Result<DuelAction> {
        self.choose(actor, session).ok_or_else(|| RuntimeError::Provider {
            actor: actor.clone(),
            reason: "actor is not a combatant in this session".into(),
        })
    }
}
