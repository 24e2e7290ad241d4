use crate::action::{ActionOutcome, DuelAction};
use crate::config::DuelConfig;
use crate::env::{ClassId, ContentOracle, DuelEnv, TerrainId};
use crate::error::{DuelError, ValidationError};
use crate::state::{
    AbortReason, ActorId, Combatant, CombatantSlot, DuelResult, DuelSession, Escrow, RitualId,
    RitualResolution, RitualStatus, RitualVerdict, SessionId, SessionState, StatusEffect,
    StatusEffectKind, Timestamp,
};

use super::CombatResolver;

/// Payload of a duel proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DuelProposal {
    pub challenger: ActorId,
    pub target: ActorId,
    pub wager: u64,
    pub terrain: TerrainId,
    pub challenger_class: ClassId,
    pub target_class: ClassId,
}

/// What a successful `submit_action` produced.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnReport {
    pub outcome: ActionOutcome,
    pub state: SessionState,
    pub turn_index: u32,
    /// Who acts next. Meaningless once `result` is set.
    pub turn_owner: ActorId,
    pub result: Option<DuelResult>,
    /// A ritual started by this action; the caller arms its timeout.
    pub ritual_started: Option<RitualId>,
}

/// Lifecycle reducer for one [`DuelSession`].
///
/// Every transition checks the current state first and rejects without
/// writing anything when it does not apply.
pub struct SessionMachine<'a> {
    session: &'a mut DuelSession,
}

impl<'a> SessionMachine<'a> {
    pub fn new(session: &'a mut DuelSession) -> Self {
        Self { session }
    }

    /// Validates a proposal and builds the session in `Proposed`.
    ///
    /// Balance checks need the ledger and happen in the caller.
    pub fn propose(
        proposal: DuelProposal,
        config: &DuelConfig,
        content: &dyn ContentOracle,
        id: SessionId,
        now: Timestamp,
        seed: u64,
    ) -> Result<DuelSession, DuelError> {
        if proposal.challenger == proposal.target {
            return Err(ValidationError::SelfChallenge.into());
        }
        if proposal.wager < config.min_wager {
            return Err(ValidationError::WagerBelowMinimum {
                wager: proposal.wager,
                minimum: config.min_wager,
            }
            .into());
        }
        let terrain = content
            .terrain(&proposal.terrain)
            .ok_or_else(|| ValidationError::UnknownTerrain(proposal.terrain.clone()))?;
        let lookup_class = |id: &ClassId| {
            content
                .class(id)
                .cloned()
                .ok_or_else(|| ValidationError::UnknownClass(id.clone()))
        };
        let challenger_class = lookup_class(&proposal.challenger_class)?;
        let target_class = lookup_class(&proposal.target_class)?;

        Ok(DuelSession {
            id,
            challenger: Combatant::new(proposal.challenger, challenger_class, config),
            target: Combatant::new(proposal.target, target_class, config),
            wager: proposal.wager,
            terrain: terrain.clone(),
            state: SessionState::Proposed,
            turn_owner: CombatantSlot::Challenger,
            turn_index: 0,
            created_at: now,
            last_action_at: now,
            seed,
            escrow: None,
            result: None,
            abort_reason: None,
            rituals: Vec::new(),
            special_event_fired: false,
            next_ritual_id: 0,
            settled_at: None,
        })
    }

    /// Checks that `actor` may accept right now, without changing anything.
    pub fn check_accept(
        &self,
        actor: &ActorId,
        now: Timestamp,
        accept_timeout_ms: u64,
    ) -> Result<(), DuelError> {
        match self.session.state {
            SessionState::Proposed => {}
            SessionState::Expired => {
                return Err(DuelError::AlreadyExpired {
                    session: self.session.id,
                });
            }
            state => return Err(DuelError::SessionNotActive { state }),
        }
        if actor != &self.session.target.identity {
            return Err(DuelError::NotAuthorized {
                actor: actor.clone(),
            });
        }
        let deadline = self
            .session
            .created_at
            .saturating_add_millis(accept_timeout_ms);
        if now >= deadline {
            return Err(DuelError::AlreadyExpired {
                session: self.session.id,
            });
        }
        Ok(())
    }

    /// Accepts the proposal with both wagers already in escrow.
    ///
    /// Returns the opening narrative.
    pub fn accept(
        &mut self,
        actor: &ActorId,
        now: Timestamp,
        accept_timeout_ms: u64,
        escrow: Escrow,
    ) -> Result<Vec<String>, DuelError> {
        self.check_accept(actor, now, accept_timeout_ms)?;

        let session = &mut *self.session;
        session.state = SessionState::InProgress;
        session.turn_owner = CombatantSlot::Challenger;
        session.turn_index = 0;
        session.last_action_at = now;
        session.escrow = Some(escrow);

        Ok(vec![
            format!(
                "{} ({}) faces {} ({}) on {} for {} each.",
                session.challenger.identity,
                session.challenger.class.name,
                session.target.identity,
                session.target.class.name,
                session.terrain.name,
                session.wager
            ),
            format!("{} strikes first.", session.challenger.identity),
        ])
    }

    /// Resolves the turn owner's action and advances the turn.
    pub fn submit_action(
        &mut self,
        actor: &ActorId,
        action: &DuelAction,
        now: Timestamp,
        env: DuelEnv<'_>,
    ) -> Result<TurnReport, DuelError> {
        if self.session.state != SessionState::InProgress {
            return Err(DuelError::SessionNotActive {
                state: self.session.state,
            });
        }
        let slot = self
            .session
            .slot_of(actor)
            .ok_or_else(|| DuelError::NotAuthorized {
                actor: actor.clone(),
            })?;
        if slot != self.session.turn_owner {
            return Err(DuelError::NotYourTurn {
                actor: actor.clone(),
                turn_owner: self.session.turn_owner_id().clone(),
            });
        }

        let outcome = CombatResolver::new(env).resolve(self.session, slot, action, now)?;

        let session = &mut *self.session;
        session.turn_index += 1;
        session.last_action_at = now;

        let result = match (session.challenger.is_defeated(), session.target.is_defeated()) {
            (true, true) => Some(DuelResult::MutualLoss),
            (false, true) => Some(DuelResult::Victory {
                winner: CombatantSlot::Challenger,
            }),
            (true, false) => Some(DuelResult::Victory {
                winner: CombatantSlot::Target,
            }),
            (false, false) => None,
        };

        if let Some(result) = result {
            session.state = SessionState::Resolved;
            session.result = Some(result);
            self.cancel_rituals();
        } else if !outcome.grants_extra_turn() {
            session.turn_owner = session.turn_owner.opponent();
        }

        let session = &*self.session;
        Ok(TurnReport {
            ritual_started: outcome.ritual,
            outcome,
            state: session.state,
            turn_index: session.turn_index,
            turn_owner: session.turn_owner_id().clone(),
            result: session.result,
        })
    }

    /// Expires an unanswered proposal. Returns whether anything changed.
    pub fn expire(&mut self) -> bool {
        if self.session.state != SessionState::Proposed {
            return false;
        }
        self.session.state = SessionState::Expired;
        true
    }

    /// Aborts a non-terminal session. No-op on terminal sessions.
    pub fn abort(&mut self, reason: AbortReason) -> bool {
        if self.session.is_terminal() {
            return false;
        }
        self.session.state = SessionState::Aborted;
        self.session.abort_reason = Some(reason);
        self.cancel_rituals();
        true
    }

    /// Resolves a pending ritual by response or timeout.
    ///
    /// `responder` is `None` for the timeout path. Returns `Ok(None)` when
    /// the ritual was already resolved or cancelled, so each ritual takes
    /// effect at most once.
    pub fn resolve_ritual(
        &mut self,
        id: RitualId,
        verdict: RitualVerdict,
        responder: Option<&ActorId>,
        config: &DuelConfig,
    ) -> Result<Option<RitualResolution>, DuelError> {
        let session_id = self.session.id;
        let ritual = self
            .session
            .ritual(id)
            .ok_or(ValidationError::UnknownRitual(id))?;
        if let Some(responder) = responder {
            if responder != &ritual.target {
                return Err(DuelError::NotAuthorized {
                    actor: responder.clone(),
                });
            }
        }
        if !ritual.is_pending() || self.session.state != SessionState::InProgress {
            return Ok(None);
        }

        let initiator_slot = ritual.initiator;
        let target = ritual.target.clone();
        let succeeded = verdict.succeeds();
        let rules = &config.ritual;

        let initiator = self.session.combatant_mut(initiator_slot);
        let effect = if succeeded {
            StatusEffect::new(StatusEffectKind::Divine, rules.buff_pct, rules.buff_turns)
        } else {
            StatusEffect::new(
                StatusEffectKind::Curse,
                rules.backfire_curse_pct,
                rules.backfire_turns,
            )
        };
        initiator.status_effects.apply(effect);
        let initiator = initiator.identity.clone();

        if let Some(ritual) = self.session.ritual_mut(id) {
            ritual.status = if succeeded {
                RitualStatus::Succeeded
            } else {
                RitualStatus::Failed
            };
        }

        Ok(Some(RitualResolution {
            session: session_id,
            ritual: id,
            initiator,
            target,
            verdict,
            succeeded,
            penalty: if succeeded { rules.penalty } else { 0 },
        }))
    }

    /// Records the balance actually collected for a succeeded ritual.
    pub fn record_ritual_penalty(&mut self, id: RitualId, collected: u64) {
        if let Some(ritual) = self.session.ritual_mut(id) {
            ritual.penalty_collected = collected;
        }
    }

    pub fn mark_settled(&mut self, now: Timestamp) {
        if self.session.settled_at.is_none() {
            self.session.settled_at = Some(now);
        }
    }

    fn cancel_rituals(&mut self) {
        for ritual in self.session.rituals.iter_mut().filter(|r| r.is_pending()) {
            ritual.status = RitualStatus::Cancelled;
        }
    }
}
