use serde::{Deserialize, Serialize};

/// One usage limit as persisted in the cache file
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct UsageEntry {
    /// ISO-8601 reset instant; empty when the remote did not report one
    pub reset_time: String,
    /// 0..=100
    pub percent_used: f64,
}

/// Usage limits as fetched at `timestamp` (epoch milliseconds).
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct UsageCacheSnapshot {
    pub timestamp: i64,
    pub current_session: UsageEntry,
    pub weekly_all: UsageEntry,
    pub weekly_sonnet: UsageEntry,
}

/// A snapshot as seen by the render path, with its freshness at read time.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedUsage {
    pub snapshot: UsageCacheSnapshot,
    pub stale: bool,
}

impl CachedUsage {
    pub fn fresh(snapshot: UsageCacheSnapshot) -> Self {
        Self {
            snapshot,
            stale: false,
        }
    }

    /// Milliseconds since the snapshot was fetched
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.snapshot.timestamp).max(0)
    }
}
