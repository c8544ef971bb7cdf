//! Settings file loader.
//!
//! The widget layout lives in a JSON file, either as the top-level object or
//! nested under one of the statusline section keys so it can share a file
//! with other tools. A missing or broken file never stops rendering.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

use crate::models::Settings;
use crate::widgets::is_known;

const SECTION_KEYS: [&str; 4] = [
    "statusline",
    "claude_statusline",
    "claudeStatusline",
    "claude-statusline",
];

/// Parse settings JSON, honoring a nested statusline section.
pub fn parse_settings(content: &str) -> Result<Settings> {
    let mut value: Value = serde_json::from_str(content).context("settings are not valid JSON")?;
    if let Some(obj) = value.as_object_mut() {
        if let Some(section) = SECTION_KEYS
            .iter()
            .find_map(|key| obj.remove(*key).filter(Value::is_object))
        {
            value = section;
        }
    }
    serde_json::from_value(value).context("settings do not match the expected shape")
}

/// Load settings from `path`, falling back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Settings::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read settings, using defaults");
            return Settings::default();
        }
    };
    match parse_settings(&content) {
        Ok(settings) => {
            warn_unknown_widgets(&settings);
            settings
        }
        Err(e) => {
            warn!(path = %path.display(), error = %format!("{e:#}"), "ignoring malformed settings");
            Settings::default()
        }
    }
}

fn warn_unknown_widgets(settings: &Settings) {
    let Some(rows) = settings.rows.as_ref() else {
        return;
    };
    for config in rows.iter().flatten() {
        if !is_known(&config.widget) {
            debug!(widget = %config.widget, "settings reference an unknown widget");
        }
    }
}
