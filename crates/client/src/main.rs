//! Duel client binary.
//!
//! Runs one unattended duel between two heuristic bots and narrates it.
//!
//! ```bash
//! DUEL_TERRAIN=volcano DUEL_SEED=42 cargo run -p duel-client
//! DUEL_SPECTATOR=carol DUEL_RITUAL_POLICY=resist cargo run -p duel-client
//! ```
use anyhow::Result;
use duel_client::{ClientConfig, logging, run_duel};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    let _guard = logging::setup_logging(&config.run_id)?;

    tracing::info!(
        "Starting duel: {} ({}) vs {} ({}) on {}",
        config.challenger,
        config.challenger_class,
        config.target,
        config.target_class,
        config.terrain
    );

    let finished = run_duel(config).await?;

    tracing::info!(
        "Duel {} finished as {} after {} turns",
        finished.id,
        finished.state,
        finished.turn_index
    );
    Ok(())
}
