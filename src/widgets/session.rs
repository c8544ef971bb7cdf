//! Session identity widgets: model, output style, vim mode, timing and ids.

use serde_json::json;

use super::{Widget, base_schema};
use crate::config::Resolved;
use crate::format::format_duration;
use crate::models::{OptionDescriptor, PreviewState, RenderContext, WidgetSchema};

pub struct Model;

/// Model family used as the color state key
fn model_family(id: &str) -> &'static str {
    let lower = id.to_lowercase();
    if lower.contains("opus") {
        "opus"
    } else if lower.contains("sonnet") {
        "sonnet"
    } else if lower.contains("haiku") {
        "haiku"
    } else {
        "other"
    }
}

impl Widget for Model {
    fn id(&self) -> &'static str {
        "model"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Model", "Active model, colored by family")
            .color("bright_white")
            .state("opus", "bright_magenta")
            .state("sonnet", "bright_yellow")
            .state("haiku", "bright_cyan")
            .option(OptionDescriptor::select(
                "format",
                "Show",
                &["name", "id"],
                "name",
            ))
            .preview(PreviewState::status(
                "Sonnet",
                json!({ "model": { "id": "claude-sonnet-4-5", "display_name": "Sonnet 4.5" } }),
            ))
            .preview(PreviewState::status(
                "Opus",
                json!({ "model": { "id": "claude-opus-4-1", "display_name": "Opus 4.1" } }),
            ))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let Some(model) = ctx.status.model.as_ref() else {
            return cfg.missing();
        };
        let id = model.id.as_deref();
        let name = model.display_name.as_deref();
        let text = match cfg.option_str("format") {
            Some("id") => id.or(name),
            _ => name.or(id),
        };
        let family = model_family(id.or(name).unwrap_or_default());
        cfg.render_with(text, |t| cfg.show_state(t, family))
    }
}

pub struct OutputStyleWidget;

impl Widget for OutputStyleWidget {
    fn id(&self) -> &'static str {
        "output-style"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Output Style", "Selected output style")
            .label("Style")
            .color("bright_blue")
            .option(OptionDescriptor::checkbox(
                "hideDefault",
                "Hide the default style",
                false,
            ))
            .preview(PreviewState::status(
                "Explanatory",
                json!({ "output_style": { "name": "Explanatory" } }),
            ))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let name = ctx
            .status
            .output_style
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .filter(|n| !(cfg.option_bool("hideDefault") && n.eq_ignore_ascii_case("default")));
        cfg.render_with(name, |n| cfg.show(n))
    }
}

pub struct VimMode;

impl Widget for VimMode {
    fn id(&self) -> &'static str {
        "vim-mode"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Vim Mode", "Editor vim mode when enabled")
            .color("white")
            .state("insert", "green")
            .state("normal", "blue")
            .state("visual", "magenta")
            .option(OptionDescriptor::select(
                "format",
                "Format",
                &["full", "short"],
                "full",
            ))
            .preview(PreviewState::status("Insert", json!({ "vim": { "mode": "INSERT" } })))
            .preview(PreviewState::status("Normal", json!({ "vim": { "mode": "NORMAL" } })))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let mode = ctx
            .status
            .vim
            .as_ref()
            .and_then(|v| v.mode.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty());
        cfg.render_with(mode, |m| {
            let state = m.to_lowercase();
            let text = match cfg.option_str("format") {
                Some("short") => m.chars().take(1).collect::<String>().to_uppercase(),
                _ => m.to_uppercase(),
            };
            cfg.show_state(&text, &state)
        })
    }
}

pub struct Turns;

impl Widget for Turns {
    fn id(&self) -> &'static str {
        "turns"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Turns", "Conversation turns so far")
            .label("Turns")
            .color("white")
            .preview(PreviewState::status("Busy", json!({ "turn_count": 42 })))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        cfg.render_with(ctx.status.turn_count, |n| cfg.show(&n.to_string()))
    }
}

pub struct SessionDuration;

impl Widget for SessionDuration {
    fn id(&self) -> &'static str {
        "session-duration"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Session Duration", "Wall time since the session started")
            .label("Time")
            .color("white")
            .preview(PreviewState::status(
                "Two hours",
                json!({ "cost": { "total_duration_ms": 8_100_000 } }),
            ))
            .preview(PreviewState::status(
                "Just started",
                json!({ "cost": { "total_duration_ms": 12_000 } }),
            ))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let ms = ctx.status.cost.as_ref().and_then(|c| c.total_duration_ms);
        cfg.render_with(ms, |ms| cfg.show(&format_duration(ms)))
    }
}

pub struct SessionId;

const DEFAULT_SESSION_ID_LEN: usize = 8;

impl Widget for SessionId {
    fn id(&self) -> &'static str {
        "session-id"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Session ID", "Session identifier, shortened")
            .label("Session")
            .color("bright_black")
            .option(OptionDescriptor::text("length", "Characters shown (0 = all)", "8"))
            .preview(PreviewState::status(
                "Session",
                json!({ "session_id": "3f2a9c1e-5b7d-4e2f-9a61-0c8d4b2e7f11" }),
            ))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        cfg.render_with(ctx.status.session_id.as_deref(), |id| {
            let len = cfg.option_usize("length").unwrap_or(DEFAULT_SESSION_ID_LEN);
            let text: String = if len == 0 {
                id.to_string()
            } else {
                id.chars().take(len).collect()
            };
            cfg.show(&text)
        })
    }
}

pub struct Version;

impl Widget for Version {
    fn id(&self) -> &'static str {
        "version"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Version", "Assistant CLI version")
            .color("bright_black")
            .option(OptionDescriptor::text("prefix", "Prefix", "v").max_length(8))
            .preview(PreviewState::status("Release", json!({ "version": "1.0.88" })))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        cfg.render_with(ctx.status.version.as_deref(), |v| {
            let prefix = cfg.option_str("prefix").unwrap_or_default();
            cfg.show(&format!("{prefix}{v}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::model_family;
    use crate::format::strip_ansi;
    use crate::models::{RenderContext, Settings, StatusPayload, WidgetConfig};
    use crate::widgets::render_widget;
    use serde_json::{Value, json};

    fn plain(name: &str, status: Value, cfg: Option<&WidgetConfig>) -> Option<String> {
        let ctx = RenderContext::new(StatusPayload::from_value(status), Settings::default());
        render_widget(name, &ctx, cfg).map(|s| strip_ansi(&s))
    }

    #[test]
    fn families() {
        assert_eq!(model_family("claude-opus-4-1"), "opus");
        assert_eq!(model_family("Claude 3.5 Sonnet"), "sonnet");
        assert_eq!(model_family("claude-3-5-haiku"), "haiku");
        assert_eq!(model_family("gpt-5"), "other");
    }

    #[test]
    fn model_name_or_id() {
        let status = json!({ "model": { "id": "claude-opus-4-1", "display_name": "Opus 4.1" } });
        assert_eq!(plain("model", status.clone(), None).as_deref(), Some("Opus 4.1"));
        let cfg = WidgetConfig::new("model").with_option("format", "id");
        assert_eq!(plain("model", status, Some(&cfg)).as_deref(), Some("claude-opus-4-1"));

        let id_only = json!({ "model": { "id": "claude-opus-4-1" } });
        assert_eq!(plain("model", id_only, None).as_deref(), Some("claude-opus-4-1"));
    }

    #[test]
    fn output_style_hide_default() {
        let status = json!({ "output_style": { "name": "default" } });
        assert_eq!(plain("output-style", status.clone(), None).as_deref(), Some("Style: default"));
        let cfg = WidgetConfig::new("output-style").with_option("hideDefault", true);
        assert_eq!(plain("output-style", status, Some(&cfg)), None);
    }

    #[test]
    fn vim_formats() {
        let status = json!({ "vim": { "mode": "insert" } });
        assert_eq!(plain("vim-mode", status.clone(), None).as_deref(), Some("INSERT"));
        let cfg = WidgetConfig::new("vim-mode").with_option("format", "short");
        assert_eq!(plain("vim-mode", status, Some(&cfg)).as_deref(), Some("I"));
    }

    #[test]
    fn duration_and_turns() {
        let status = json!({ "cost": { "total_duration_ms": 8_100_000 }, "turn_count": 0 });
        assert_eq!(
            plain("session-duration", status.clone(), None).as_deref(),
            Some("Time: 2hr 15m")
        );
        // zero is data, not absence
        assert_eq!(plain("turns", status, None).as_deref(), Some("Turns: 0"));
    }

    #[test]
    fn session_id_length() {
        let status = json!({ "session_id": "abcdef0123456789" });
        assert_eq!(plain("session-id", status.clone(), None).as_deref(), Some("Session: abcdef01"));
        let cfg = WidgetConfig::new("session-id").with_option("length", 0);
        assert_eq!(
            plain("session-id", status, Some(&cfg)).as_deref(),
            Some("Session: abcdef0123456789")
        );
    }

    #[test]
    fn version_prefix() {
        let status = json!({ "version": "1.0.88" });
        assert_eq!(plain("version", status.clone(), None).as_deref(), Some("v1.0.88"));
        let cfg = WidgetConfig::new("version")
            .with_option("prefix", "")
            .with_label("CLI");
        assert_eq!(plain("version", status, Some(&cfg)).as_deref(), Some("CLI: 1.0.88"));
    }
}
