//! Platform-specific directory utilities
//!
//! Mirrors the client's layout: one directory per run under both the
//! cache (logs) and the data (settlement logs) roots.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "duel")
}

/// Log root, e.g. `~/.cache/duel/logs` on Linux
pub fn log_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("duel").join("logs"))
}

/// Settlement data root, e.g. `~/.local/share/duel` on Linux
///
/// `DUEL_DATA_DIR` overrides the platform location.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("DUEL_DATA_DIR") {
        return PathBuf::from(dir);
    }
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./duel_data"))
}

/// Run directories under `root`, newest first
pub fn list_runs(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut runs: Vec<(String, PathBuf, std::time::SystemTime)> = Vec::new();
    for entry in std::fs::read_dir(root)
        .with_context(|| format!("Failed to read directory: {}", root.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir()
            && let Some(run_id) = path.file_name().and_then(|n| n.to_str())
        {
            let modified = entry.metadata()?.modified()?;
            runs.push((run_id.to_string(), path.clone(), modified));
        }
    }

    runs.sort_by(|a, b| b.2.cmp(&a.2));
    Ok(runs.into_iter().map(|(id, path, _)| (id, path)).collect())
}

/// Resolve `run` (or the newest run) to a file inside its directory
pub fn run_file(root: &Path, run: Option<&str>, file: &str) -> Result<(String, PathBuf)> {
    let (run_id, run_dir) = match run {
        Some(id) => (id.to_string(), root.join(id)),
        None => list_runs(root)?
            .into_iter()
            .next()
            .with_context(|| format!("No runs found in {}", root.display()))?,
    };

    let path = run_dir.join(file);
    if !path.exists() {
        anyhow::bail!("File not found for run {}: {}", run_id, path.display());
    }
    Ok((run_id, path))
}
