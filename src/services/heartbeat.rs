//! Rate limiting for the "nothing new" notice.

use chrono::{DateTime, Duration, Utc};

/// Tracks when the last heartbeat went out.
///
/// Kept in memory only; after a restart the first empty poll sends one.
#[derive(Debug, Clone)]
pub struct HeartbeatTimer {
    interval: Duration,
    last_sent: Option<DateTime<Utc>>,
}

impl HeartbeatTimer {
    /// Intervals beyond what `Duration` can represent are clamped to its maximum.
    pub fn new(interval_minutes: u64) -> Self {
        let interval = i64::try_from(interval_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .unwrap_or(Duration::MAX);
        Self {
            interval,
            last_sent: None,
        }
    }

    /// Start from a known previous heartbeat.
    pub fn with_last_sent(mut self, last_sent: DateTime<Utc>) -> Self {
        self.last_sent = Some(last_sent);
        self
    }

    pub fn interval_minutes(&self) -> u64 {
        u64::try_from(self.interval.num_minutes()).unwrap_or(0)
    }

    pub fn last_sent(&self) -> Option<DateTime<Utc>> {
        self.last_sent
    }

    /// True when no heartbeat was ever sent or the interval has fully elapsed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => now.signed_duration_since(last) >= self.interval,
        }
    }

    /// Record a heartbeat the channel accepted.
    pub fn mark_sent(&mut self, at: DateTime<Utc>) {
        self.last_sent = Some(at);
    }
}
