//! Remote usage limits from the Claude OAuth usage endpoint.
//!
//! This is the fetch collaborator handed to
//! [`refresh_usage_cache`](crate::cache::refresh_usage_cache); nothing on the
//! render path calls it.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use directories::BaseDirs;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

const DEFAULT_USER_AGENT: &str = "claude-code";
const USAGE_ENDPOINT: &str = "https://api.anthropic.com/api/oauth/usage";
const ANTHROPIC_BETA: &str = "oauth-2025-04-20";
const HTTP_TIMEOUT_SECS: u64 = 5;

static USER_AGENT: Lazy<String> = Lazy::new(resolve_user_agent);
static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.\d+\.\d+(?:-[A-Za-z0-9.]+)?)").unwrap());

/// One limit window as reported by the endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageLimit {
    #[serde(default)]
    pub utilization: Option<f64>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub resets_at: Option<DateTime<Utc>>,
}

/// Usage response; any window may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageResponse {
    #[serde(default)]
    pub five_hour: Option<UsageLimit>,
    #[serde(default)]
    pub seven_day: Option<UsageLimit>,
    #[serde(default)]
    pub seven_day_sonnet: Option<UsageLimit>,
    #[serde(default)]
    pub seven_day_opus: Option<UsageLimit>,
}

fn resolve_user_agent() -> String {
    if let Some(explicit) = non_empty_env(&["CLAUDE_STATUSLINE_USER_AGENT"]) {
        return explicit;
    }

    match non_empty_env(&["CLAUDE_STATUSLINE_CLAUDE_VERSION", "CLAUDE_CODE_VERSION"])
        .or_else(package_json_version)
        .or_else(cli_version)
    {
        Some(version) => format!("claude-code/{version}"),
        None => DEFAULT_USER_AGENT.to_string(),
    }
}

fn non_empty_env(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

fn package_json_version() -> Option<String> {
    let path = non_empty_env(&[
        "CLAUDE_STATUSLINE_CLAUDE_PACKAGE_JSON",
        "CLAUDE_CODE_PACKAGE_JSON",
    ])?;
    let contents = fs::read_to_string(path).ok()?;
    let json: serde_json::Value = serde_json::from_str(&contents).ok()?;
    json.get("version")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
}

fn cli_version() -> Option<String> {
    let output = Command::new("claude").arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    extract_version(&String::from_utf8_lossy(&output.stdout))
        .or_else(|| extract_version(&String::from_utf8_lossy(&output.stderr)))
}

fn extract_version(text: &str) -> Option<String> {
    VERSION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `CLAUDE_STATUSLINE_FETCH_USAGE=0` turns remote refreshes off.
pub fn fetch_enabled() -> bool {
    match env::var("CLAUDE_STATUSLINE_FETCH_USAGE") {
        Ok(val) => {
            let trimmed = val.trim();
            trimmed.is_empty()
                || matches!(
                    trimmed.to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
        }
        Err(_) => true,
    }
}

/// Fetch current usage limits with the first OAuth token found.
pub fn fetch_usage(claude_paths: &[PathBuf]) -> Result<UsageResponse> {
    let token = find_oauth_token(claude_paths).ok_or_else(|| anyhow!("no OAuth token found"))?;
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
        .build()
        .into();

    debug!(endpoint = USAGE_ENDPOINT, user_agent = USER_AGENT.as_str(), "fetching usage");
    let mut response = agent
        .get(USAGE_ENDPOINT)
        .header("Authorization", &format!("Bearer {token}"))
        .header("User-Agent", USER_AGENT.as_str())
        .header("Accept", "application/json")
        .header("anthropic-beta", ANTHROPIC_BETA)
        .call()
        .context("usage request failed")?;

    if response.status() != 200 {
        bail!("usage endpoint returned {}", response.status());
    }

    response
        .body_mut()
        .read_json::<UsageResponse>()
        .context("usage response was not valid JSON")
}

/// Token lookup order: environment, `.credentials.json` in each config
/// dir (then `~/.claude`), then the macOS keychain.
pub fn find_oauth_token(claude_paths: &[PathBuf]) -> Option<String> {
    if let Some(token) = non_empty_env(&["CLAUDE_CODE_OAUTH_TOKEN", "ANTHROPIC_AUTH_TOKEN"]) {
        return Some(token);
    }

    let legacy = BaseDirs::new().map(|b| b.home_dir().join(".claude"));
    for base in claude_paths.iter().cloned().chain(legacy) {
        if let Ok(raw) = fs::read_to_string(base.join(".credentials.json")) {
            if let Some(token) = token_from_credentials(&raw) {
                return Some(token);
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(token) = read_from_macos_keychain() {
            return Some(token);
        }
    }

    None
}

/// `claudeAiOauth.accessToken` out of a credentials document
pub fn token_from_credentials(raw: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;
    json.get("claudeAiOauth")
        .and_then(|v| v.get("accessToken"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Keychain service name; a custom `CLAUDE_CONFIG_DIR` gets an
/// 8-character SHA-256 suffix.
pub fn keychain_service_name(config_dir: Option<&str>) -> String {
    use sha2::{Digest, Sha256};

    let mut service = "Claude Code-credentials".to_string();
    if let Some(dir) = config_dir {
        let hash = Sha256::digest(dir.as_bytes());
        let suffix: String = format!("{hash:x}").chars().take(8).collect();
        service.push('-');
        service.push_str(&suffix);
    }
    service
}

#[cfg(target_os = "macos")]
fn read_from_macos_keychain() -> Option<String> {
    let username = env::var("USER").ok()?;
    let config_dir = env::var("CLAUDE_CONFIG_DIR").ok();
    let service = keychain_service_name(config_dir.as_deref());

    let output = Command::new("security")
        .args(["find-generic-password", "-a", &username, "-s", &service, "-w"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    token_from_credentials(&String::from_utf8_lossy(&output.stdout))
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(opt
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    fn parses_partial_response() {
        let resp: UsageResponse = serde_json::from_value(json!({
            "five_hour": { "utilization": 42.5, "resets_at": "2025-01-01T12:00:00Z" },
            "seven_day": { "utilization": 10.0, "resets_at": null },
            "seven_day_sonnet": null,
            "extra_usage": { "is_enabled": false }
        }))
        .unwrap();
        let five = resp.five_hour.unwrap();
        assert_eq!(five.utilization, Some(42.5));
        assert!(five.resets_at.is_some());
        assert_eq!(resp.seven_day.unwrap().resets_at, None);
        assert!(resp.seven_day_sonnet.is_none());
    }

    #[test]
    fn bad_reset_time_is_absent() {
        let limit: UsageLimit =
            serde_json::from_value(json!({ "utilization": 1.0, "resets_at": "soon" })).unwrap();
        assert_eq!(limit.resets_at, None);
    }

    #[test]
    fn credentials_token() {
        let raw = r#"{"claudeAiOauth":{"accessToken":"  tok-123 "}}"#;
        assert_eq!(token_from_credentials(raw).as_deref(), Some("tok-123"));
        assert_eq!(token_from_credentials(r#"{"claudeAiOauth":{}}"#), None);
        assert_eq!(token_from_credentials("not json"), None);
    }

    #[test]
    fn keychain_suffix() {
        assert_eq!(keychain_service_name(None), "Claude Code-credentials");
        let named = keychain_service_name(Some("/tmp/claude"));
        assert!(named.starts_with("Claude Code-credentials-"));
        assert_eq!(named.len(), "Claude Code-credentials-".len() + 8);
    }

    #[test]
    #[serial]
    fn token_lookup_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".credentials.json"),
            r#"{"claudeAiOauth":{"accessToken":"from-file"}}"#,
        )
        .unwrap();
        let paths = vec![dir.path().to_path_buf()];

        unsafe {
            env::remove_var("ANTHROPIC_AUTH_TOKEN");
            env::set_var("CLAUDE_CODE_OAUTH_TOKEN", " from-env ");
        }
        assert_eq!(find_oauth_token(&paths).as_deref(), Some("from-env"));

        unsafe { env::remove_var("CLAUDE_CODE_OAUTH_TOKEN") };
        assert_eq!(find_oauth_token(&paths).as_deref(), Some("from-file"));
    }

    #[test]
    #[serial]
    fn fetch_toggle() {
        unsafe { env::remove_var("CLAUDE_STATUSLINE_FETCH_USAGE") };
        assert!(fetch_enabled());
        unsafe { env::set_var("CLAUDE_STATUSLINE_FETCH_USAGE", "0") };
        assert!(!fetch_enabled());
        unsafe { env::set_var("CLAUDE_STATUSLINE_FETCH_USAGE", "yes") };
        assert!(fetch_enabled());
        unsafe { env::remove_var("CLAUDE_STATUSLINE_FETCH_USAGE") };
    }

    #[test]
    fn version_extraction() {
        assert_eq!(extract_version("1.0.88 (Claude Code)").as_deref(), Some("1.0.88"));
        assert_eq!(extract_version("v2.1.0-beta.1").as_deref(), Some("2.1.0-beta.1"));
        assert_eq!(extract_version("unknown"), None);
    }
}
