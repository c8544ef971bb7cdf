//! # Config Resolver
//!
//! Merges a widget's schema defaults with an optional per-instance
//! [`WidgetConfig`] and owns the behavior every widget shares: label
//! synthesis, label/content coloring, option lookup and the four-state
//! no-data policy (`naVisibility`).

use serde_json::Value;

use crate::format::paint;
use crate::models::{WidgetConfig, WidgetSchema};

/// Label color when the instance does not set `labelColor`
pub const DEFAULT_LABEL_COLOR: &str = "dim";

pub const NA_VISIBILITY_KEY: &str = "naVisibility";

/// How a widget appears when its data is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NaVisibility {
    #[default]
    Hide,
    Na,
    Dash,
    Empty,
}

impl NaVisibility {
    pub const CHOICES: [&'static str; 4] = ["hide", "na", "dash", "empty"];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hide" => Some(Self::Hide),
            "na" | "n/a" => Some(Self::Na),
            "dash" | "-" => Some(Self::Dash),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hide => "hide",
            Self::Na => "na",
            Self::Dash => "dash",
            Self::Empty => "empty",
        }
    }
}

/// Turn the three-state `label` field into the literal prefix text.
///
/// Unset uses the schema default plus a colon; `""` suppresses the label;
/// anything else is kept as written, with a colon added only after a
/// trailing letter or digit so `"Branch"` reads `Branch:` while `"⎇"` or
/// `"Ctx:"` stay untouched.
pub fn resolve_label(schema_default: &str, label: Option<&str>) -> Option<String> {
    match label {
        None if schema_default.is_empty() => None,
        None => Some(format!("{schema_default}:")),
        Some(custom) => {
            let custom = custom.trim_end();
            if custom.is_empty() {
                return None;
            }
            match custom.chars().last() {
                Some(c) if c.is_alphanumeric() => Some(format!("{custom}:")),
                _ => Some(custom.to_string()),
            }
        }
    }
}

/// Effective configuration of one widget instance.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    schema: &'a WidgetSchema,
    config: Option<&'a WidgetConfig>,
    label: Option<String>,
    na: NaVisibility,
}

impl<'a> Resolved<'a> {
    pub fn new(schema: &'a WidgetSchema, config: Option<&'a WidgetConfig>) -> Self {
        let label = resolve_label(
            schema.default_label,
            config.and_then(|c| c.label.as_deref()),
        );
        let na = config
            .and_then(|c| c.options.get(NA_VISIBILITY_KEY))
            .or_else(|| schema.option_default(NA_VISIBILITY_KEY))
            .and_then(Value::as_str)
            .and_then(NaVisibility::parse)
            .unwrap_or_default();
        Self {
            schema,
            config,
            label,
            na,
        }
    }

    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn na_visibility(&self) -> NaVisibility {
        self.na
    }

    pub fn label_color(&self) -> &str {
        self.config
            .and_then(|c| c.label_color.as_ref())
            .map(|c| c.as_str())
            .unwrap_or(DEFAULT_LABEL_COLOR)
    }

    pub fn content_color(&self) -> &str {
        self.config
            .and_then(|c| c.color.as_ref())
            .map(|c| c.as_str())
            .unwrap_or(self.schema.default_color)
    }

    /// `colors[state]`, then `color`, then the schema's state default,
    /// then the schema's content color.
    pub fn state_color(&self, state: &str) -> &str {
        if let Some(cfg) = self.config {
            if let Some(c) = cfg.colors.get(state) {
                return c.as_str();
            }
            if let Some(c) = cfg.color.as_ref() {
                return c.as_str();
            }
        }
        self.schema
            .state_color(state)
            .unwrap_or(self.schema.default_color)
    }

    /// Instance option, falling back to the schema default
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.config
            .and_then(|c| c.options.get(key))
            .or_else(|| self.schema.option_default(key))
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.option(key).and_then(Value::as_str)
    }

    pub fn option_bool(&self, key: &str) -> bool {
        match self.option(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.as_str(), "true" | "1" | "yes" | "on"),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            _ => false,
        }
    }

    pub fn option_usize(&self, key: &str) -> Option<usize> {
        match self.option(key)? {
            Value::Number(n) => n.as_u64().map(|v| v as usize),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Label plus `text` in the content color; empty text counts as no data.
    pub fn show(&self, text: &str) -> Option<String> {
        self.show_in(text, self.content_color())
    }

    /// Label plus `text` in the color configured for `state`.
    pub fn show_state(&self, text: &str, state: &str) -> Option<String> {
        self.show_in(text, self.state_color(state))
    }

    pub fn show_in(&self, text: &str, color: &str) -> Option<String> {
        if text.is_empty() {
            return self.missing();
        }
        Some(self.prefixed(&paint(text, color)))
    }

    /// Label plus content that is already colored.
    pub fn show_painted(&self, painted: String) -> Option<String> {
        if painted.is_empty() {
            return self.missing();
        }
        Some(self.prefixed(&painted))
    }

    /// Render the configured no-data placeholder.
    pub fn missing(&self) -> Option<String> {
        let placeholder = match self.na {
            NaVisibility::Hide => return None,
            NaVisibility::Na => "N/A",
            NaVisibility::Dash => "-",
            NaVisibility::Empty => {
                return Some(
                    self.label
                        .as_deref()
                        .map(|l| paint(l, self.label_color()))
                        .unwrap_or_default(),
                );
            }
        };
        Some(self.prefixed(&paint(placeholder, self.content_color())))
    }

    /// Render `value` through `f`, or the no-data placeholder when absent.
    pub fn render_with<T>(&self, value: Option<T>, f: impl FnOnce(T) -> Option<String>) -> Option<String> {
        match value {
            Some(v) => f(v),
            None => self.missing(),
        }
    }

    fn prefixed(&self, content: &str) -> String {
        match self.label.as_deref() {
            Some(label) => format!("{} {}", paint(label, self.label_color()), content),
            None => content.to_string(),
        }
    }
}
