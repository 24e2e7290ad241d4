//! Clean logs and settlement data command
//!
//! Removes the client's per-run directories:
//! - Logs (cache directory)
//! - Settlement logs (data directory)
//!
//! Always prompts for confirmation before deletion unless `--yes` is given.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::dirs;

/// Clean logs and settlement data
#[derive(Parser, Debug)]
pub struct Clean {
    /// Clean only logs (cache directory)
    #[arg(long)]
    pub logs: bool,

    /// Clean only settlement data (data directory)
    #[arg(long)]
    pub data: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Clean a single run instead of everything
    #[arg(long)]
    pub run: Option<String>,
}

impl Clean {
    pub fn execute(self) -> Result<()> {
        let targets = self.targets()?;

        if targets.is_empty() {
            println!(
                "{}",
                style("Nothing to clean - directories don't exist yet").dim()
            );
            return Ok(());
        }

        println!("{}", style("Clean duel data").yellow().bold());
        println!();
        println!("The following will be deleted:");
        for (label, path) in &targets {
            println!("  {} {}", style("→").cyan(), style(label).bold());
            println!("    {}", style(path.display()).dim());
        }
        println!();

        if !self.yes && !confirm()? {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }

        for (label, path) in targets {
            print!("Deleting {}... ", label);
            io::stdout().flush()?;

            std::fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to delete: {}", path.display()))?;

            println!("{}", style("✓").green());
        }

        println!();
        println!("{}", style("✓ Cleanup complete!").green().bold());
        Ok(())
    }

    /// Existing directories selected by the flags; no flag selects both roots.
    fn targets(&self) -> Result<Vec<(String, PathBuf)>> {
        let clean_logs = self.logs || !self.data;
        let clean_data = self.data || !self.logs;

        let mut roots = Vec::new();
        if clean_logs {
            roots.push(("logs", dirs::log_dir()));
        }
        if clean_data {
            roots.push(("settlements", dirs::data_dir()));
        }

        let mut targets = Vec::new();
        for (kind, root) in roots {
            match &self.run {
                Some(run) => {
                    let dir = root.join(run);
                    if dir.exists() {
                        targets.push((format!("Run {} {}", run, kind), dir));
                    }
                }
                None if root.exists() => targets.push((format!("All {}", kind), root)),
                None => {}
            }
        }

        if let Some(run) = &self.run
            && targets.is_empty()
        {
            anyhow::bail!("Run not found: {}", run);
        }
        Ok(targets)
    }
}

fn confirm() -> Result<bool> {
    print!("{} ", style("Proceed? [y/N]").yellow().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
