use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Default usage cache TTL in milliseconds
pub const DEFAULT_CACHE_TTL_MS: u64 = 60_000;

pub const DEFAULT_SEPARATOR: &str = "|";

/// A user-authored color: a named ANSI color, `dim`, `bold`, `#rrggbb`,
/// or several of those separated by spaces.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ColorValue(pub String);

impl ColorValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColorValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One widget instance placed in a row.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub widget: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub colors: BTreeMap<String, ColorValue>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
    /// Unset, empty (no label) or a literal label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<ColorValue>,
}

impl WidgetConfig {
    pub fn new(widget: impl Into<String>) -> Self {
        Self {
            widget: widget.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<ColorValue>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Usage cache TTL in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<u64>,
    /// Rows of widget instances, top to bottom, left to right
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<WidgetConfig>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator_color: Option<ColorValue>,
}

impl Settings {
    pub fn cache_ttl_ms(&self) -> u64 {
        self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL_MS)
    }

    pub fn separator_text(&self) -> &str {
        self.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR)
    }

    pub fn with_rows(rows: Vec<Vec<WidgetConfig>>) -> Self {
        Self {
            rows: Some(rows),
            ..Self::default()
        }
    }
}
