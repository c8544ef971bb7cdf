//! # Widget Statusline
//!
//! A configurable status line for Claude Code sessions, assembled from a
//! fixed set of independently configurable widgets.
//!
//! ## Overview
//!
//! The assistant pipes a JSON status payload to the binary on every refresh.
//! The render pipeline resolves each configured widget against its schema,
//! applies labels, colors and the no-data policy, and joins the results into
//! one or more rows. Usage-limit data comes from a TTL-gated cache on disk
//! that is refreshed out of band, so rendering never waits on the network.
//!
//! ## Features
//!
//! - `git` (default): Enables repository inspection via gix
//! - `colors` (default): Enables terminal color output via owo-colors

/// Disk-persisted usage cache with single-flight refresh
pub mod cache;

/// Command-line argument parsing and configuration
pub mod cli;

/// Per-widget configuration resolution
pub mod config;

/// Colors and numeric formats shared by widgets
pub mod format;

/// Git repository inspection (feature-gated)
#[cfg(feature = "git")]
pub mod git;

/// Data models for the status payload, settings, schemas and usage
pub mod models;

/// Row assembly and preview contexts
pub mod render;

/// Settings file loading
pub mod settings;

/// Online usage limits retrieved from the Claude OAuth API
pub mod usage_api;

/// Utility functions for paths, stdin and terminal size
pub mod utils;

/// The widget registry and every widget implementation
pub mod widgets;

pub use cache::{RefreshError, UsageCacheConfig};
pub use models::{RenderContext, Settings, StatusPayload, WidgetConfig, WidgetSchema};
pub use render::{preview_context, render_status_line, render_widget, widget_names, widget_schema};
