//! Status payload piped in by the coding assistant on every refresh.
//!
//! Every field is optional and absence means "no data". Known fields that
//! carry an unexpected JSON type are treated as absent instead of failing the
//! whole payload, and unknown top-level keys are kept in `extra` so the
//! payload round-trips unchanged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ModelInfo {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub current_dir: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub project_dir: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct OutputStyle {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct VimState {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ContextWindow {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub remaining_percentage: Option<f64>,
}

/// Aggregate cost fields reported by the assistant
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SessionCost {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub total_cost_usd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub total_duration_ms: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub total_lines_added: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub total_lines_removed: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct TokenMetrics {
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StatusPayload {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub workspace: Option<Workspace>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelInfo>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub context_window: Option<ContextWindow>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub output_style: Option<OutputStyle>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub vim: Option<VimState>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cost: Option<SessionCost>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub token_metrics: Option<TokenMetrics>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub turn_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub exceeds_200k_tokens: Option<bool>,
    /// Fields this version does not know about, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusPayload {
    /// Parse a payload, treating anything that is not a JSON object as empty.
    pub fn from_slice(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Workspace directory if reported, else the bare `cwd`.
    pub fn current_dir(&self) -> Option<&str> {
        self.workspace
            .as_ref()
            .and_then(|w| w.current_dir.as_deref())
            .or(self.cwd.as_deref())
    }

    pub fn tokens(&self) -> Option<&TokenMetrics> {
        self.token_metrics.as_ref()
    }
}

/// Deserialize a value, mapping type mismatches to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], but a whole-valued float such as `1500000.0` also counts.
fn lenient_count<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(whole_number(value)).ok())
}

fn whole_number(value: Value) -> Value {
    let Some(f) = value.as_f64().filter(|_| value.is_f64()) else {
        return value;
    };
    if !f.is_finite() || f.fract() != 0.0 {
        return value;
    }
    if (0.0..u64::MAX as f64).contains(&f) {
        Value::from(f as u64)
    } else if (i64::MIN as f64..0.0).contains(&f) {
        Value::from(f as i64)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_are_none() {
        let status = StatusPayload::from_value(json!({}));
        assert!(status.model.is_none());
        assert!(status.token_metrics.is_none());
        assert!(status.exceeds_200k_tokens.is_none());
        assert!(status.current_dir().is_none());
    }

    #[test]
    fn wrong_types_degrade_to_absent() {
        let status = StatusPayload::from_value(json!({
            "version": 5,
            "turn_count": "many",
            "token_metrics": { "cached_tokens": 1200, "input_tokens": "lots" },
        }));
        assert!(status.version.is_none());
        assert!(status.turn_count.is_none());
        let tokens = status.tokens().unwrap();
        assert_eq!(tokens.cached_tokens, Some(1200));
        assert!(tokens.input_tokens.is_none());
    }

    #[test]
    fn whole_floats_count_as_integers() {
        let status = StatusPayload::from_value(json!({
            "turn_count": 4.0,
            "cost": { "total_duration_ms": 90000.0, "total_lines_removed": -12.0 },
            "token_metrics": { "cached_tokens": 1500000.0, "input_tokens": 1.5, "output_tokens": -3.0 },
        }));
        assert_eq!(status.turn_count, Some(4));
        let cost = status.cost.as_ref().unwrap();
        assert_eq!(cost.total_duration_ms, Some(90_000));
        assert_eq!(cost.total_lines_removed, Some(-12));
        let tokens = status.tokens().unwrap();
        assert_eq!(tokens.cached_tokens, Some(1_500_000));
        assert!(tokens.input_tokens.is_none());
        assert!(tokens.output_tokens.is_none());
    }

    #[test]
    fn unknown_fields_round_trip() {
        let input = json!({
            "session_id": "abc",
            "future_field": { "nested": [1, 2, 3] },
        });
        let status = StatusPayload::from_value(input.clone());
        assert_eq!(status.extra.get("future_field"), input.get("future_field"));
        let back = serde_json::to_value(&status).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn workspace_dir_wins_over_cwd() {
        let status = StatusPayload::from_value(json!({
            "cwd": "/tmp/a",
            "workspace": { "current_dir": "/tmp/b" },
        }));
        assert_eq!(status.current_dir(), Some("/tmp/b"));

        let status = StatusPayload::from_value(json!({ "cwd": "/tmp/a" }));
        assert_eq!(status.current_dir(), Some("/tmp/a"));
    }

    #[test]
    fn non_object_payload_is_empty() {
        let status = StatusPayload::from_slice(b"[1,2,3]");
        assert_eq!(status, StatusPayload::default());
    }
}
