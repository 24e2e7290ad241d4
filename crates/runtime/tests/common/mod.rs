#![allow(dead_code)]

use std::sync::Arc;

use duel_core::{ActorId, ClassId, DuelProposal, RngOracle, SessionId, TerrainId};
use duel_runtime::{
    BasicAttackProvider, DuelHandle, DuelRuntime, InMemoryLedger, InMemorySettlementRepo,
    RuntimeConfig,
};

/// Every d100 rolls 100: no criticals, no misses, no counters.
pub struct SteadyRng;

impl RngOracle for SteadyRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        99
    }
}

pub const STARTING_BALANCE: u64 = 1_000;
/// Warrior basic attack with steady rolls: 12 * 110%.
pub const WARRIOR_HIT: u32 = 13;

pub fn alice() -> ActorId {
    ActorId::new("alice")
}

pub fn bob() -> ActorId {
    ActorId::new("bob")
}

pub fn carol() -> ActorId {
    ActorId::new("carol")
}

pub fn proposal(challenger: ActorId, target: ActorId, wager: u64) -> DuelProposal {
    DuelProposal {
        challenger,
        target,
        wager,
        terrain: TerrainId::new("arena"),
        challenger_class: ClassId::new("warrior"),
        target_class: ClassId::new("warrior"),
    }
}

/// Config where a single warrior hit ends the duel.
pub fn one_hit_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.duel.max_hp = WARRIOR_HIT;
    config
}

pub struct Harness {
    pub runtime: DuelRuntime,
    pub handle: DuelHandle,
    pub ledger: Arc<InMemoryLedger>,
    pub repo: Arc<InMemorySettlementRepo>,
}

impl Harness {
    pub fn balance(&self, actor: &ActorId) -> u64 {
        self.ledger.available(actor)
    }

    /// Proposes alice vs bob and lets bob accept.
    pub async fn start_duel(&self, wager: u64) -> SessionId {
        let session = self
            .handle
            .propose_duel(proposal(alice(), bob(), wager))
            .await
            .expect("proposal should be accepted")
            .id;
        self.handle
            .accept(session, &bob())
            .await
            .expect("bob should be able to accept");
        session
    }
}

pub async fn harness(config: RuntimeConfig) -> Harness {
    let ledger = Arc::new(InMemoryLedger::with_balances([
        ("alice", STARTING_BALANCE),
        ("bob", STARTING_BALANCE),
        ("carol", STARTING_BALANCE),
    ]));
    let repo = Arc::new(InMemorySettlementRepo::new());
    let runtime = DuelRuntime::builder()
        .config(config)
        .rng(Arc::new(SteadyRng))
        .ledger(ledger.clone())
        .repository(repo.clone())
        .default_provider(BasicAttackProvider)
        .seed(7)
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    Harness {
        runtime,
        handle,
        ledger,
        repo,
    }
}
