//! Read and inspect a run's settlement log
//!
//! Opens `settlements.log` through the runtime's own reader, so the
//! output reflects exactly what a restarted runtime would load.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use duel_core::{SettlementOutcome, SettlementRecord};
use duel_runtime::{FileSettlementLog, SETTLEMENT_LOG_FILE, SettlementRepository};
use std::path::PathBuf;

use crate::dirs;

/// Read and inspect settlement records
#[derive(Parser)]
pub struct ReadSettlements {
    /// Run ID to read (defaults to the most recent run)
    #[arg(short, long, value_name = "RUN")]
    run: Option<String>,

    /// Custom data directory (defaults to platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One line per record with totals
    Table,
    /// Full JSON output
    Json,
}

impl ReadSettlements {
    pub fn execute(self) -> Result<()> {
        let data_dir = self.data_dir.unwrap_or_else(dirs::data_dir);
        let (run_id, log_path) =
            dirs::run_file(&data_dir, self.run.as_deref(), SETTLEMENT_LOG_FILE)?;
        let run_dir = log_path
            .parent()
            .context("Settlement log has no parent directory")?;

        let log = FileSettlementLog::open(run_dir)
            .with_context(|| format!("Failed to open {}", log_path.display()))?;
        let records = log.list()?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
            OutputFormat::Table => print_table(&run_id, &log_path, &records),
        }
        Ok(())
    }
}

fn print_table(run_id: &str, path: &std::path::Path, records: &[SettlementRecord]) {
    println!("{} {}", style("Run:").bold().cyan(), run_id);
    println!("{} {}", style("Log:").bold().cyan(), path.display());
    println!("{} {}", style("Records:").bold().cyan(), records.len());
    println!();

    if records.is_empty() {
        println!("{}", style("No settlements recorded").dim());
        return;
    }

    println!(
        "{:<14} {:<8} {:<16} {:<16} {:>8} {:>8}",
        style("SESSION").bold(),
        style("OUTCOME").bold(),
        style("WINNER").bold(),
        style("LOSER").bold(),
        style("PAYOUT").bold(),
        style("REFUND").bold()
    );
    for record in records {
        let outcome: &'static str = record.outcome.into();
        let outcome = match record.outcome {
            SettlementOutcome::Victory => style(outcome).green(),
            SettlementOutcome::Refund => style(outcome).yellow(),
        };
        println!(
            "{:<14} {:<8} {:<16} {:<16} {:>8} {:>8}",
            record.session_id.to_string(),
            outcome,
            record.winner.as_ref().map_or("-", |a| a.as_str()),
            record.loser.as_ref().map_or("-", |a| a.as_str()),
            record.payout,
            record.refunded
        );
    }

    let paid: u64 = records.iter().map(|r| r.payout).sum();
    let refunded: u64 = records.iter().map(|r| r.refunded).sum();
    println!();
    println!(
        "{} paid out {}, refunded {}",
        style("Totals:").bold().cyan(),
        paid,
        refunded
    );
}
