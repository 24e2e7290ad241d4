//! Runtime configuration and environment overrides.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use duel_core::DuelConfig;

/// Configuration for a [`DuelRuntime`](crate::DuelRuntime).
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub duel: DuelConfig,
    pub timeouts: TimeoutConfig,
    pub settlement: RetryPolicy,
    /// Capacity of each event bus topic.
    pub event_buffer_size: usize,
    /// Capacity of the fired-timer queue feeding the timeout worker.
    pub timer_buffer_size: usize,
    /// Concluded sessions kept readable after they leave the registry.
    pub archive_capacity: usize,
    /// Directory of the durable settlement log. `None` keeps records in memory.
    pub settlement_log_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            duel: DuelConfig::default(),
            timeouts: TimeoutConfig::default(),
            settlement: RetryPolicy::default(),
            event_buffer_size: 100,
            timer_buffer_size: 64,
            archive_capacity: 256,
            settlement_log_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by process environment variables.
    ///
    /// Environment variables:
    /// - `DUEL_ACCEPT_TIMEOUT_SECS` - Time the target has to accept (default: 60)
    /// - `DUEL_TURN_TIMEOUT_SECS` - Time each turn owner has to act (default: 45)
    /// - `DUEL_RITUAL_TIMEOUT_SECS` - Time a ritual target has to respond (default: 30)
    /// - `DUEL_MIN_WAGER` - Smallest accepted wager (default: 10)
    /// - `DUEL_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    /// - `DUEL_ARCHIVE_CAPACITY` - Archived sessions kept readable (default: 256)
    /// - `DUEL_SETTLEMENT_LOG_DIR` - Directory for the settlement log (default: in memory)
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(secs) = read_env::<u64>("DUEL_ACCEPT_TIMEOUT_SECS") {
            self.timeouts.accept = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env::<u64>("DUEL_TURN_TIMEOUT_SECS") {
            self.timeouts.turn = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env::<u64>("DUEL_RITUAL_TIMEOUT_SECS") {
            self.timeouts.ritual = Duration::from_secs(secs);
        }
        if let Some(min_wager) = read_env::<u64>("DUEL_MIN_WAGER") {
            self.duel.min_wager = min_wager;
        }
        if let Some(capacity) = read_env::<usize>("DUEL_EVENT_BUFFER") {
            self.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("DUEL_ARCHIVE_CAPACITY") {
            self.archive_capacity = capacity;
        }
        if let Ok(dir) = env::var("DUEL_SETTLEMENT_LOG_DIR") {
            self.settlement_log_dir = Some(PathBuf::from(dir));
        }
        self
    }
}

/// Deadlines enforced by the timeout supervisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub accept: Duration,
    /// Restarted after every resolved action.
    pub turn: Duration,
    /// Runs independently of the turn clock.
    pub ritual: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            accept: Duration::from_secs(60),
            turn: Duration::from_secs(45),
            ritual: Duration::from_secs(30),
        }
    }
}

/// How hard settlement tries before handing off to a scheduled retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made inside the call that concluded the session.
    pub inline_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Delay before each scheduled retry after inline attempts are exhausted.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Backoff before inline attempt `attempt` (1-based, first retry is 1).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            inline_attempts: 3,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
            retry_delay: Duration::from_secs(5),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let policy = RetryPolicy {
            inline_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
            retry_delay: Duration::from_secs(1),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[test]
    fn defaults_keep_turn_shorter_than_accept() {
        let config = RuntimeConfig::default();
        assert!(config.timeouts.turn < config.timeouts.accept);
        assert!(config.settlement_log_dir.is_none());
        assert_eq!(config.duel, DuelConfig::default());
    }
}
