//! Tail client logs command
//!
//! Prints the end of a run's `client.log` and keeps following it, with an
//! optional substring filter.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;

use crate::dirs;

/// Monitor client logs in real-time
#[derive(Parser, Debug)]
pub struct TailLogs {
    /// Run ID to monitor (defaults to latest)
    pub run: Option<String>,

    /// Number of lines to show from history before tailing
    #[arg(short = 'n', long, default_value = "10")]
    pub lines: usize,

    /// Only print lines containing this text (e.g. a session id)
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Print the history and exit instead of following
    #[arg(long)]
    pub no_follow: bool,

    /// Poll interval in milliseconds
    #[arg(long, default_value = "100")]
    pub poll_interval: u64,
}

impl TailLogs {
    pub fn execute(self) -> Result<()> {
        let log_dir = dirs::log_dir();
        if !log_dir.exists() {
            eprintln!("{}", style("✗ Log directory not found").red().bold());
            eprintln!("  Path: {}", style(log_dir.display()).dim());
            eprintln!();
            eprintln!("  Run the client first to generate logs:");
            eprintln!("    {}", style("cargo run -p duel-client").cyan());
            anyhow::bail!("Log directory does not exist");
        }

        let (run_id, log_path) = dirs::run_file(&log_dir, self.run.as_deref(), "client.log")
            .context("Failed to find log file")?;

        println!("{}", style("Monitoring duel logs").green().bold());
        println!("  Run:      {}", style(&run_id).cyan());
        println!("  Log file: {}", style(log_path.display()).dim());
        if let Some(pattern) = &self.grep {
            println!("  Filter:   {}", style(pattern).yellow());
        }
        println!();

        self.tail_file(&log_path)
    }

    fn matches(&self, line: &str) -> bool {
        self.grep
            .as_deref()
            .is_none_or(|pattern| line.contains(pattern))
    }

    fn tail_file(&self, path: &Path) -> Result<()> {
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        for line in self.history(&mut file)? {
            println!("{}", line);
        }
        if self.no_follow {
            return Ok(());
        }

        // history() leaves the cursor at the end of the file
        let mut reader = BufReader::new(file);
        let poll_interval = Duration::from_millis(self.poll_interval);
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => std::thread::sleep(poll_interval),
                Ok(_) => {
                    if self.matches(&line) {
                        print!("{}", line);
                    }
                }
                Err(e) => {
                    eprintln!("{}", style(format!("Error reading log file: {}", e)).red());
                    anyhow::bail!("Failed to read log file");
                }
            }
        }
    }

    /// Last `lines` matching lines
    fn history(&self, file: &mut File) -> Result<Vec<String>> {
        file.seek(SeekFrom::Start(0))?;
        let lines: Vec<String> = BufReader::new(&mut *file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .context("Failed to read lines from log file")?
            .into_iter()
            .filter(|line| self.matches(line))
            .collect();
        file.seek(SeekFrom::End(0))?;

        let start = lines.len().saturating_sub(self.lines);
        Ok(lines[start..].to_vec())
    }
}
