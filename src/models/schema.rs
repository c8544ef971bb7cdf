//! Static widget metadata consumed by the configuration GUI.

use serde::Serialize;
use serde_json::Value;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Text,
    Select,
    Checkbox,
    Color,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionDescriptor {
    pub key: &'static str,
    pub kind: OptionKind,
    pub label: &'static str,
    pub default: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl OptionDescriptor {
    pub fn text(key: &'static str, label: &'static str, default: &str) -> Self {
        Self {
            key,
            kind: OptionKind::Text,
            label,
            default: Value::from(default),
            choices: Vec::new(),
            max_length: None,
        }
    }

    pub fn select(
        key: &'static str,
        label: &'static str,
        choices: &[&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            key,
            kind: OptionKind::Select,
            label,
            default: Value::from(default),
            choices: choices.to_vec(),
            max_length: None,
        }
    }

    pub fn checkbox(key: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            key,
            kind: OptionKind::Checkbox,
            label,
            default: Value::from(default),
            choices: Vec::new(),
            max_length: None,
        }
    }

    pub fn color(key: &'static str, label: &'static str, default: &str) -> Self {
        Self {
            key,
            kind: OptionKind::Color,
            label,
            default: Value::from(default),
            choices: Vec::new(),
            max_length: None,
        }
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }
}

/// Default color for one named visual state (e.g. `dirty`, `high`)
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StateColor {
    pub key: &'static str,
    pub color: &'static str,
}

/// Named fixture used to preview a widget
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PreviewState {
    pub label: &'static str,
    /// Partial status payload
    pub status: Value,
    /// Optional git fixture, same shape as `GitInfo`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<Value>,
    /// Optional usage snapshot fixture
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
}

impl PreviewState {
    pub fn status(label: &'static str, status: Value) -> Self {
        Self {
            label,
            status,
            git: None,
            usage: None,
        }
    }

    pub fn git(label: &'static str, git: Value) -> Self {
        Self {
            label,
            status: Value::Object(Default::default()),
            git: Some(git),
            usage: None,
        }
    }

    pub fn usage(label: &'static str, usage: Value) -> Self {
        Self {
            label,
            status: Value::Object(Default::default()),
            git: None,
            usage: Some(usage),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSchema {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default_color: &'static str,
    /// Empty when the widget renders without a label by default
    pub default_label: &'static str,
    pub state_colors: Vec<StateColor>,
    pub options: Vec<OptionDescriptor>,
    pub preview_states: Vec<PreviewState>,
}

impl WidgetSchema {
    pub fn new(id: &'static str, name: &'static str, description: &'static str) -> Self {
        Self {
            id,
            name,
            description,
            default_color: "white",
            default_label: "",
            state_colors: Vec::new(),
            options: Vec::new(),
            preview_states: Vec::new(),
        }
    }

    pub fn color(mut self, color: &'static str) -> Self {
        self.default_color = color;
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.default_label = label;
        self
    }

    pub fn state(mut self, key: &'static str, color: &'static str) -> Self {
        self.state_colors.push(StateColor { key, color });
        self
    }

    pub fn option(mut self, option: OptionDescriptor) -> Self {
        self.options.push(option);
        self
    }

    pub fn preview(mut self, state: PreviewState) -> Self {
        self.preview_states.push(state);
        self
    }

    pub fn option_default(&self, key: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|o| o.key == key)
            .map(|o| &o.default)
    }

    pub fn state_color(&self, key: &str) -> Option<&'static str> {
        self.state_colors
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.color)
    }

    pub fn preview_state(&self, label: &str) -> Option<&PreviewState> {
        self.preview_states.iter().find(|p| p.label == label)
    }
}
