//! Active sessions keyed by id, each behind its own lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use duel_core::{ActorId, DuelError, DuelSession, SessionId, ValidationError};
use tokio::sync::{Mutex as SessionLock, MutexGuard as SessionGuard};

use super::archive::Archive;

/// One live session and the lock that serializes operations on it.
#[derive(Debug)]
pub struct SessionSlot {
    id: SessionId,
    session: SessionLock<DuelSession>,
}

impl SessionSlot {
    fn new(session: DuelSession) -> Self {
        Self {
            id: session.id,
            session: SessionLock::new(session),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Locks for a player operation, failing fast instead of queueing.
    pub fn try_lock(&self) -> Result<SessionGuard<'_, DuelSession>, DuelError> {
        self.session
            .try_lock()
            .map_err(|_| DuelError::SessionBusy { session: self.id })
    }

    /// Waits for the lock. Used by supervisor paths and read-only snapshots.
    pub async fn lock(&self) -> SessionGuard<'_, DuelSession> {
        self.session.lock().await
    }
}

/// Where a session currently lives.
#[derive(Debug)]
pub enum Lookup {
    Active(Arc<SessionSlot>),
    Archived(Box<DuelSession>),
    Missing,
}

/// Registry of live sessions, engaged actors and the archive.
///
/// The std locks here guard only map updates and are never held across an
/// await point; session state itself sits behind each slot's async lock.
#[derive(Debug)]
pub struct SessionRegistry {
    next_id: AtomicU64,
    active: RwLock<HashMap<SessionId, Arc<SessionSlot>>>,
    /// Actor to the non-terminal session it fights in.
    engaged: Mutex<HashMap<ActorId, SessionId>>,
    archive: Mutex<Archive>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionRegistry {
    pub fn new(archive_capacity: usize) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            active: RwLock::new(HashMap::new()),
            engaged: Mutex::new(HashMap::new()),
            archive: Mutex::new(Archive::new(archive_capacity)),
        }
    }

    pub fn allocate_id(&self) -> SessionId {
        SessionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Fails if `actor` already fights in a non-terminal session.
    pub fn ensure_available(&self, actor: &ActorId) -> Result<(), DuelError> {
        match guard(&self.engaged).get(actor) {
            Some(&session) => Err(ValidationError::ActorAlreadyEngaged {
                actor: actor.clone(),
                session,
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Registers a new session and engages both combatants atomically.
    pub fn insert(&self, session: DuelSession) -> Result<Arc<SessionSlot>, DuelError> {
        let id = session.id;
        let actors = [
            session.challenger.identity.clone(),
            session.target.identity.clone(),
        ];

        let mut engaged = guard(&self.engaged);
        for actor in &actors {
            if let Some(&other) = engaged.get(actor) {
                return Err(ValidationError::ActorAlreadyEngaged {
                    actor: actor.clone(),
                    session: other,
                }
                .into());
            }
        }
        let slot = Arc::new(SessionSlot::new(session));
        self.active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&slot));
        for actor in actors {
            engaged.insert(actor, id);
        }
        Ok(slot)
    }

    pub fn lookup(&self, id: SessionId) -> Lookup {
        if let Some(slot) = self.get(id) {
            return Lookup::Active(slot);
        }
        match guard(&self.archive).get(id) {
            Some(session) => Lookup::Archived(Box::new(session.clone())),
            None => Lookup::Missing,
        }
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<SessionSlot>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Frees both combatants to join other duels.
    pub fn release_engagement(&self, session: &DuelSession) {
        let mut engaged = guard(&self.engaged);
        for actor in [&session.challenger.identity, &session.target.identity] {
            if engaged.get(actor) == Some(&session.id) {
                engaged.remove(actor);
            }
        }
    }

    /// Moves a concluded session out of the active set.
    pub fn archive(&self, session: &DuelSession) {
        self.release_engagement(session);
        self.active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session.id);
        guard(&self.archive).insert(session.clone());
    }

    pub fn engaged_in(&self, actor: &ActorId) -> Option<SessionId> {
        guard(&self.engaged).get(actor).copied()
    }

    pub fn active_count(&self) -> usize {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn archived_count(&self) -> usize {
        guard(&self.archive).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_core::{
        Catalog, ClassId, DuelConfig, DuelProposal, SessionMachine, SessionState, TerrainId,
        Timestamp,
    };

    fn session(id: u64, challenger: &str, target: &str) -> DuelSession {
        let proposal = DuelProposal {
            challenger: ActorId::new(challenger),
            target: ActorId::new(target),
            wager: 100,
            terrain: TerrainId::new("arena"),
            challenger_class: ClassId::new("warrior"),
            target_class: ClassId::new("rogue"),
        };
        SessionMachine::propose(
            proposal,
            &DuelConfig::default(),
            &Catalog::builtin(),
            SessionId(id),
            Timestamp::ZERO,
            7,
        )
        .unwrap()
    }

    #[test]
    fn engaged_actor_cannot_join_a_second_duel() {
        let registry = SessionRegistry::new(4);
        registry.insert(session(1, "alice", "bob")).unwrap();

        let err = registry.insert(session(2, "carol", "bob")).unwrap_err();
        assert!(matches!(
            err,
            DuelError::Validation(ValidationError::ActorAlreadyEngaged { session: SessionId(1), .. })
        ));
        assert!(registry.ensure_available(&ActorId::new("carol")).is_ok());
        assert_eq!(registry.engaged_in(&ActorId::new("carol")), None);
    }

    #[test]
    fn archive_frees_actors_and_keeps_snapshot() {
        let registry = SessionRegistry::new(4);
        let mut concluded = session(1, "alice", "bob");
        registry.insert(concluded.clone()).unwrap();
        concluded.state = SessionState::Expired;

        registry.archive(&concluded);

        assert_eq!(registry.active_count(), 0);
        assert!(registry.ensure_available(&ActorId::new("alice")).is_ok());
        match registry.lookup(SessionId(1)) {
            Lookup::Archived(s) => assert_eq!(s.state, SessionState::Expired),
            other => panic!("expected archived session, got {other:?}"),
        }
    }

    #[test]
    fn archive_evicts_oldest_first() {
        let registry = SessionRegistry::new(2);
        for id in 1..=3 {
            let s = session(id, &format!("a{id}"), &format!("b{id}"));
            registry.insert(s.clone()).unwrap();
            registry.archive(&s);
        }

        assert_eq!(registry.archived_count(), 2);
        assert!(matches!(registry.lookup(SessionId(1)), Lookup::Missing));
        assert!(matches!(registry.lookup(SessionId(3)), Lookup::Archived(_)));
    }

    #[tokio::test]
    async fn second_player_operation_is_rejected_while_locked() {
        let registry = SessionRegistry::new(1);
        let slot = registry.insert(session(1, "alice", "bob")).unwrap();

        let _held = slot.try_lock().unwrap();
        assert!(matches!(
            slot.try_lock(),
            Err(DuelError::SessionBusy { session: SessionId(1) })
        ));
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let registry = SessionRegistry::new(0);
        let first = registry.allocate_id();
        let second = registry.allocate_id();
        assert!(second > first);
    }
}
