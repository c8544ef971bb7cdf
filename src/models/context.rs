use chrono::{DateTime, Utc};

use super::{CachedUsage, GitInfo, Settings, StatusPayload};

/// Everything a widget may read. Built once per render and never mutated.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub status: StatusPayload,
    pub usage: Option<CachedUsage>,
    /// Visible columns available; 0 means unbounded
    pub terminal_width: usize,
    pub settings: Settings,
    /// Already-resolved repository state; widgets never run git themselves
    pub git: Option<GitInfo>,
    /// Clock for countdowns and staleness, injected so rendering stays pure
    pub now: DateTime<Utc>,
}

impl RenderContext {
    pub fn new(status: StatusPayload, settings: Settings) -> Self {
        Self {
            status,
            usage: None,
            terminal_width: 0,
            settings,
            git: None,
            now: Utc::now(),
        }
    }

    pub fn with_usage(mut self, usage: Option<CachedUsage>) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_git(mut self, git: Option<GitInfo>) -> Self {
        self.git = git;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.terminal_width = width;
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}
