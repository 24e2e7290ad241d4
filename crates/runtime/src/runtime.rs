//! Duel runtime orchestrator.
//!
//! [`DuelRuntime`] owns the timeout worker and the action providers.
//! [`DuelHandle`] is the cloneable façade adapters share.
use std::sync::Arc;

use duel_core::{ActorId, Catalog, ContentOracle, DuelSession, PcgRng, RngOracle, SessionId, TurnReport};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{ActionProvider, DuelHandle, ProviderRegistry, Result, RuntimeError};
use crate::clock::Clock;
use crate::config::RuntimeConfig;
use crate::events::EventBus;
use crate::ledger::BalanceLedger;
use crate::repository::{FileSettlementLog, InMemorySettlementRepo, SettlementRepository};
use crate::service::DuelService;
use crate::sessions::SessionRegistry;
use crate::settlement::SettlementService;
use crate::supervisor::TimeoutSupervisor;
use crate::workers::TimeoutWorker;

/// Main runtime that hosts duels.
///
/// Design: Runtime owns workers and coordinates execution.
/// [`DuelHandle`] provides a cloneable façade for clients.
pub struct DuelRuntime {
    handle: DuelHandle,
    service: Arc<DuelService>,
    providers: ProviderRegistry,
    shutdown_tx: oneshot::Sender<()>,
    timeout_worker: JoinHandle<()>,
}

impl DuelRuntime {
    /// Create a new runtime builder
    pub fn builder() -> DuelRuntimeBuilder {
        DuelRuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> DuelHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.service.config
    }

    pub fn providers_mut(&mut self) -> &mut ProviderRegistry {
        &mut self.providers
    }

    /// Plays one turn with the provider bound to the turn owner.
    pub async fn step(&self, session: SessionId) -> Result<TurnReport> {
        let snapshot = self.handle.snapshot(session).await?;
        let provider = self.providers.get(snapshot.turn_owner_id())?;
        self.handle.play_turn(session, provider.as_ref()).await
    }

    /// Plays turns until the session is terminal and returns its final state.
    pub async fn run_to_completion(&self, session: SessionId) -> Result<DuelSession> {
        loop {
            let snapshot = self.handle.snapshot(session).await?;
            if snapshot.is_terminal() {
                return Ok(snapshot);
            }
            self.step(session).await?;
        }
    }

    /// Shutdown the runtime gracefully
    ///
    /// Pending timers are dropped; in-flight timer handling finishes first.
    pub async fn shutdown(self) -> Result<()> {
        // The worker may already be gone; nothing to signal then.
        let _ = self.shutdown_tx.send(());
        self.timeout_worker
            .await
            .map_err(RuntimeError::WorkerJoin)?;
        self.service.supervisor.shutdown();
        info!(target: "runtime", "Duel runtime stopped");
        Ok(())
    }
}

/// Builder for [`DuelRuntime`] with flexible configuration.
pub struct DuelRuntimeBuilder {
    config: RuntimeConfig,
    content: Option<Arc<dyn ContentOracle>>,
    rng: Option<Arc<dyn RngOracle>>,
    ledger: Option<Arc<dyn BalanceLedger>>,
    repository: Option<Arc<dyn SettlementRepository>>,
    entropy: Option<u64>,
    providers: ProviderRegistry,
}

impl DuelRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            content: None,
            rng: None,
            ledger: None,
            repository: None,
            entropy: None,
            providers: ProviderRegistry::new(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Terrain and class catalog (default: built-in content)
    pub fn content(mut self, content: Arc<dyn ContentOracle>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Set the required balance ledger
    pub fn ledger(mut self, ledger: Arc<dyn BalanceLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Settlement store (default: file log if configured, else in memory)
    pub fn repository(mut self, repository: Arc<dyn SettlementRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Entropy mixed into every session seed. A fixed value replays duels.
    pub fn seed(mut self, entropy: u64) -> Self {
        self.entropy = Some(entropy);
        self
    }

    pub fn provider(mut self, actor: impl Into<ActorId>, provider: impl ActionProvider + 'static) -> Self {
        self.providers.bind(actor, provider);
        self
    }

    pub fn default_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.providers.set_default(provider);
        self
    }

    /// Build the runtime and start the timeout worker.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self) -> Result<DuelRuntime> {
        let ledger = self.ledger.ok_or(RuntimeError::MissingLedger)?;
        let repository: Arc<dyn SettlementRepository> = match (self.repository, &self.config.settlement_log_dir) {
            (Some(repository), _) => repository,
            (None, Some(dir)) => Arc::new(FileSettlementLog::open(dir)?),
            (None, None) => Arc::new(InMemorySettlementRepo::new()),
        };
        let clock = Clock::system();
        let entropy = self
            .entropy
            .unwrap_or_else(|| clock.now().as_millis());

        let events = EventBus::with_capacity(self.config.event_buffer_size);
        let (fired_tx, fired_rx) = mpsc::channel(self.config.timer_buffer_size.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let service = Arc::new(DuelService {
            content: self.content.unwrap_or_else(|| Arc::new(Catalog::builtin())),
            rng: self.rng.unwrap_or_else(|| Arc::new(PcgRng)),
            entropy,
            settlement: SettlementService::new(
                Arc::clone(&ledger),
                repository,
                self.config.settlement,
                events.clone(),
            ),
            ledger,
            registry: SessionRegistry::new(self.config.archive_capacity),
            supervisor: TimeoutSupervisor::new(fired_tx),
            events,
            clock,
            config: self.config,
        });

        let worker = TimeoutWorker::new(Arc::clone(&service), fired_rx, shutdown_rx);
        let timeout_worker = tokio::spawn(async move {
            worker.run().await;
        });

        info!(
            target: "runtime",
            accept_timeout_s = service.config.timeouts.accept.as_secs(),
            turn_timeout_s = service.config.timeouts.turn.as_secs(),
            ritual_timeout_s = service.config.timeouts.ritual.as_secs(),
            "Duel runtime started"
        );

        Ok(DuelRuntime {
            handle: DuelHandle::new(Arc::clone(&service)),
            service,
            providers: self.providers,
            shutdown_tx,
            timeout_worker,
        })
    }
}
