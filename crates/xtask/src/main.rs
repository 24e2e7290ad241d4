//! Development tasks for the duel workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, ReadSettlements, TailLogs};

/// Development tasks for the duel workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for duel runs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Monitor client logs in real-time
    TailLogs(TailLogs),

    /// Clean logs and settlement data
    Clean(Clean),

    /// Read and inspect a run's settlement log
    ReadSettlements(ReadSettlements),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for DUEL_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::TailLogs(cmd) => cmd.execute(),
        Command::Clean(cmd) => cmd.execute(),
        Command::ReadSettlements(cmd) => cmd.execute(),
    }
}
