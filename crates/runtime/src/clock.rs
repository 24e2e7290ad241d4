use std::time::Duration;

use duel_core::Timestamp;
use tokio::time::Instant;

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Wall-clock milliseconds driven by tokio's time source.
///
/// The epoch is read once from the system clock; later readings add tokio
/// elapsed time, so paused test time advances session timestamps too.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    epoch_ms: u64,
    start: Instant,
}

impl Clock {
    pub fn system() -> Self {
        let epoch_ms = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
        Self::starting_at(epoch_ms)
    }

    pub fn starting_at(epoch_ms: u64) -> Self {
        Self {
            epoch_ms,
            start: Instant::now(),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.epoch_ms.saturating_add(millis(self.start.elapsed())))
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn follows_paused_time() {
        let clock = Clock::starting_at(1_000);
        assert_eq!(clock.now(), Timestamp::from_millis(1_000));

        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(clock.now(), Timestamp::from_millis(1_250));
    }

    #[test]
    fn millis_saturates_on_huge_durations() {
        assert_eq!(millis(Duration::from_secs(3)), 3_000);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
