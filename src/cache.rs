//! # Usage Cache
//!
//! Disk-persisted snapshot of the remote usage limits. The render path only
//! ever reads the file ([`load_usage_cache`]); fetching happens out of band
//! through [`refresh_usage_cache`], which bounds the fetch with a timeout,
//! writes the result atomically and allows one refresh per cache file at a
//! time within the process.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::settings::DEFAULT_CACHE_TTL_MS;
use crate::models::{CachedUsage, Settings, UsageCacheSnapshot, UsageEntry};
use crate::usage_api::{UsageLimit, UsageResponse};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the cache lives and how long a snapshot stays fresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageCacheConfig {
    pub path: PathBuf,
    pub ttl: Duration,
    pub fetch_timeout: Duration,
}

impl UsageCacheConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// TTL taken from the `cacheTtl` setting
    pub fn from_settings(path: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self::new(path).with_ttl(Duration::from_millis(settings.cache_ttl_ms()))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("usage fetch failed: {0:#}")]
    Fetch(anyhow::Error),
    #[error("usage fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("a usage refresh is already running for {}", .0.display())]
    InFlight(PathBuf),
}

static IN_FLIGHT: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Marks a cache path busy until dropped
struct FlightGuard(PathBuf);

impl FlightGuard {
    fn acquire(path: &Path) -> Result<Self, RefreshError> {
        let mut busy = IN_FLIGHT.lock().unwrap_or_else(PoisonError::into_inner);
        if !busy.insert(path.to_path_buf()) {
            return Err(RefreshError::InFlight(path.to_path_buf()));
        }
        Ok(Self(path.to_path_buf()))
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut busy = IN_FLIGHT.lock().unwrap_or_else(PoisonError::into_inner);
        busy.remove(&self.0);
    }
}

/// Read the snapshot at `path`. Missing or unparseable files are `None`.
pub fn load_cache_from_disk(path: &Path) -> Option<UsageCacheSnapshot> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "usage cache not readable");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "usage cache malformed");
            None
        }
    }
}

/// Fresh while strictly younger than `ttl`.
pub fn is_cache_valid(snapshot: &UsageCacheSnapshot, ttl: Duration, now: DateTime<Utc>) -> bool {
    let age = now.timestamp_millis().saturating_sub(snapshot.timestamp);
    i128::from(age) < ttl.as_millis() as i128
}

/// Snapshot for rendering, flagged stale once past its TTL. Never fetches.
pub fn load_usage_cache(config: &UsageCacheConfig, now: DateTime<Utc>) -> Option<CachedUsage> {
    let snapshot = load_cache_from_disk(&config.path)?;
    let stale = !is_cache_valid(&snapshot, config.ttl, now);
    Some(CachedUsage { snapshot, stale })
}

/// Fetch, map and persist a new snapshot.
///
/// `fetch` runs on a worker thread and is abandoned after
/// `config.fetch_timeout`. On any fetch failure the file on disk is left
/// alone. A failed write is logged and the fetched snapshot still returned.
pub fn refresh_usage_cache<F>(
    config: &UsageCacheConfig,
    fetch: F,
) -> Result<UsageCacheSnapshot, RefreshError>
where
    F: FnOnce() -> anyhow::Result<UsageResponse> + Send + 'static,
{
    let _guard = FlightGuard::acquire(&config.path)?;

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(fetch());
    });

    let response = match rx.recv_timeout(config.fetch_timeout) {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => return Err(RefreshError::Fetch(e)),
        Err(RecvTimeoutError::Timeout) => {
            return Err(RefreshError::Timeout(config.fetch_timeout));
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(RefreshError::Fetch(anyhow::anyhow!(
                "fetch worker exited without a result"
            )));
        }
    };

    let snapshot = snapshot_from_response(&response, Utc::now());
    match write_cache(&config.path, &snapshot) {
        Ok(()) => info!(path = %config.path.display(), "usage cache refreshed"),
        Err(e) => warn!(path = %config.path.display(), error = %format!("{e:#}"), "could not write usage cache"),
    }
    Ok(snapshot)
}

/// Map a usage response onto the cached shape, stamped with `now`.
pub fn snapshot_from_response(response: &UsageResponse, now: DateTime<Utc>) -> UsageCacheSnapshot {
    UsageCacheSnapshot {
        timestamp: now.timestamp_millis(),
        current_session: entry_from_limit(response.five_hour.as_ref()),
        weekly_all: entry_from_limit(response.seven_day.as_ref()),
        weekly_sonnet: entry_from_limit(response.seven_day_sonnet.as_ref()),
    }
}

fn entry_from_limit(limit: Option<&UsageLimit>) -> UsageEntry {
    let Some(limit) = limit else {
        return UsageEntry::default();
    };
    let percent_used = limit
        .utilization
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0))
        .unwrap_or(0.0);
    UsageEntry {
        reset_time: limit.resets_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        percent_used,
    }
}

/// Write via a temp file in the target directory, then rename over `path`.
pub fn write_cache(path: &Path, snapshot: &UsageCacheSnapshot) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, snapshot)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
