//! Bot-vs-bot duel client.
//!
//! Composition root for an unattended duel:
//!
//! ```text
//! ClientConfig ──→ ContentFactory (catalog + balance)
//!              ──→ InMemoryLedger (seeded balances)
//!              ──→ DuelRuntime (HeuristicBot for both sides)
//!                    └─→ Narrator (event output, spectator replies)
//! ```
pub mod bot;
pub mod config;
pub mod logging;
pub mod narrator;

use std::sync::Arc;

use anyhow::{Context, Result};
use duel_content::ContentFactory;
use duel_core::{DuelProposal, DuelSession};
use duel_runtime::{DuelRuntime, InMemoryLedger};
use tokio::sync::oneshot;

pub use bot::HeuristicBot;
pub use config::ClientConfig;
pub use narrator::Narrator;

/// Plays one duel to completion and returns the final session.
pub async fn run_duel(mut config: ClientConfig) -> Result<DuelSession> {
    let factory = match &config.content_dir {
        Some(dir) => ContentFactory::new(dir.clone()),
        None => ContentFactory::bundled(),
    };
    let catalog = factory
        .load_catalog()
        .with_context(|| format!("loading content from {}", factory.data_dir().display()))?;
    config.runtime.duel = factory.load_config()?;
    config.runtime = config.runtime.with_env_overrides();
    config
        .runtime
        .settlement_log_dir
        .get_or_insert_with(|| logging::data_directory().join(&config.run_id));

    let mut actors = vec![
        (config.challenger.clone(), config.starting_balance),
        (config.target.clone(), config.starting_balance),
    ];
    if let Some(spectator) = &config.spectator {
        actors.push((spectator.clone(), config.starting_balance));
    }
    let ledger = Arc::new(InMemoryLedger::with_balances(actors));

    let challenger_bot =
        HeuristicBot::new(config.runtime.duel.clone()).with_spectator(config.spectator.clone());
    let target_bot = HeuristicBot::new(config.runtime.duel.clone());

    let mut builder = DuelRuntime::builder()
        .config(config.runtime.clone())
        .content(Arc::new(catalog))
        .ledger(ledger.clone())
        .provider(config.challenger.clone(), challenger_bot)
        .provider(config.target.clone(), target_bot);
    if let Some(seed) = config.seed {
        builder = builder.seed(seed);
    }
    let runtime = builder.build().await?;
    let handle = runtime.handle();

    let (stop_tx, stop_rx) = oneshot::channel();
    let narrator = Narrator::new(handle.clone(), config.output)
        .with_spectator(config.spectator.clone(), config.ritual_policy);
    let narrator_task = tokio::spawn(narrator.run(stop_rx));

    let proposed = handle
        .propose_duel(DuelProposal {
            challenger: config.challenger.clone(),
            target: config.target.clone(),
            wager: config.wager,
            terrain: config.terrain.clone(),
            challenger_class: config.challenger_class.clone(),
            target_class: config.target_class.clone(),
        })
        .await?;
    handle.accept(proposed.id, &config.target).await?;

    let finished = runtime.run_to_completion(proposed.id).await?;

    let _ = stop_tx.send(());
    if let Err(e) = narrator_task.await {
        tracing::warn!("Narrator task failed: {}", e);
    }

    for actor in [&config.challenger, &config.target] {
        tracing::info!("Final balance: {} = {}", actor, ledger.available(actor));
    }
    if let Some(spectator) = &config.spectator {
        tracing::info!("Final balance: {} = {}", spectator, ledger.available(spectator));
    }

    runtime.shutdown().await?;
    Ok(finished)
}
