//! Logging to stderr and to a per-run file.
use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop and must outlive the run.
pub fn setup_logging(run_id: &str) -> Result<WorkerGuard> {
    let run_log_dir = log_directory().join(run_id);
    std::fs::create_dir_all(&run_log_dir)?;

    let file_appender = tracing_appender::rolling::never(&run_log_dir, "client.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    tracing::info!("Logging initialized: run={}", run_id);
    tracing::info!("Log file: {}/client.log", run_log_dir.display());

    Ok(guard)
}

/// Platform cache directory for logs, e.g. `~/.cache/duel/logs` on Linux.
pub fn log_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "duel")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("duel").join("logs"))
}

/// Data directory holding one settlement log per run.
///
/// `DUEL_DATA_DIR` overrides the platform location.
pub fn data_directory() -> PathBuf {
    if let Some(dir) = std::env::var_os("DUEL_DATA_DIR") {
        return PathBuf::from(dir);
    }
    directories::ProjectDirs::from("", "", "duel")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./duel_data"))
}
