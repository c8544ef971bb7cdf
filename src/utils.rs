use std::io::Read;
use std::path::PathBuf;

pub const SETTINGS_FILE: &str = "statusline-widgets.json";
pub const USAGE_CACHE_FILE: &str = "statusline-usage.json";

/// Claude config directories that exist, for credential lookup.
///
/// `override_env` is a comma-separated list (as in `CLAUDE_CONFIG_DIR`);
/// when none of its entries exist the defaults `~/.claude` and
/// `$XDG_CONFIG_HOME/claude` are used.
pub fn claude_paths(override_env: Option<&str>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = override_env
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.is_dir())
        .collect();
    if !paths.is_empty() {
        return paths;
    }

    let basedirs = directories::BaseDirs::new();
    let home = basedirs
        .as_ref()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"));
    let xdg_config = basedirs
        .as_ref()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| home.join(".config"));
    for base in [home.join(".claude"), xdg_config.join("claude")] {
        if base.is_dir() {
            paths.push(base);
        }
    }
    paths
}

fn claude_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().join(".claude"))
        .unwrap_or_else(|| PathBuf::from(".claude"))
}

/// `~/.claude/statusline-widgets.json`
pub fn default_settings_path() -> PathBuf {
    claude_home().join(SETTINGS_FILE)
}

/// `~/.claude/statusline-usage.json`
pub fn default_usage_cache_path() -> PathBuf {
    claude_home().join(USAGE_CACHE_FILE)
}

/// Explicit width wins; otherwise the attached terminal, else unbounded (0).
pub fn terminal_width(explicit: Option<usize>) -> usize {
    if let Some(width) = explicit {
        return width;
    }
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(0)
}

pub fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;
    Ok(buf)
}
