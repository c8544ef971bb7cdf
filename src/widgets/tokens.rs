//! Token, cost and context-overflow widgets.

use serde_json::json;

use super::{Widget, base_schema};
use crate::config::Resolved;
use crate::format::{format_cost, format_tokens, paint};
use crate::models::status::TokenMetrics;
use crate::models::{OptionDescriptor, PreviewState, RenderContext, WidgetSchema};

/// A counter read out of `token_metrics`
pub struct TokenWidget {
    id: &'static str,
    name: &'static str,
    label: &'static str,
    description: &'static str,
    color: &'static str,
    pick: fn(&TokenMetrics) -> Option<u64>,
}

pub static TOKENS_INPUT: TokenWidget = TokenWidget {
    id: "tokens-input",
    name: "Input Tokens",
    label: "In",
    description: "Input tokens sent this session",
    color: "white",
    pick: |t| t.input_tokens,
};

pub static TOKENS_OUTPUT: TokenWidget = TokenWidget {
    id: "tokens-output",
    name: "Output Tokens",
    label: "Out",
    description: "Output tokens generated this session",
    color: "white",
    pick: |t| t.output_tokens,
};

pub static TOKENS_CACHED: TokenWidget = TokenWidget {
    id: "tokens-cached",
    name: "Cached Tokens",
    label: "Cached",
    description: "Tokens served from the prompt cache",
    color: "bright_black",
    pick: |t| t.cached_tokens,
};

pub static TOKENS_TOTAL: TokenWidget = TokenWidget {
    id: "tokens-total",
    name: "Total Tokens",
    label: "Tokens",
    description: "All tokens this session",
    color: "bright_white",
    pick: |t| t.total_tokens,
};

impl Widget for TokenWidget {
    fn id(&self) -> &'static str {
        self.id
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id, self.name, self.description)
            .label(self.label)
            .color(self.color)
            .option(OptionDescriptor::select(
                "format",
                "Number format",
                &["compact", "raw"],
                "compact",
            ))
            .preview(PreviewState::status(
                "Large session",
                json!({ "token_metrics": {
                    "input_tokens": 48_200,
                    "output_tokens": 12_900,
                    "cached_tokens": 1_500_000,
                    "total_tokens": 1_561_100,
                } }),
            ))
            .preview(PreviewState::status(
                "Small session",
                json!({ "token_metrics": {
                    "input_tokens": 812,
                    "output_tokens": 96,
                    "cached_tokens": 0,
                    "total_tokens": 908,
                } }),
            ))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let count = ctx.status.tokens().and_then(self.pick);
        cfg.render_with(count, |n| {
            let text = match cfg.option_str("format") {
                Some("raw") => n.to_string(),
                _ => format_tokens(n),
            };
            cfg.show(&text)
        })
    }
}

/// Shown only while the context exceeds 200K tokens
pub struct Exceeds200k;

impl Widget for Exceeds200k {
    fn id(&self) -> &'static str {
        "exceeds-200k"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Over 200K", "Warning when the context exceeds 200K tokens")
            .color("bold red")
            .option(OptionDescriptor::text("text", "Text", "OVER 200K").max_length(24))
            .preview(PreviewState::status("Exceeded", json!({ "exceeds_200k_tokens": true })))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        match ctx.status.exceeds_200k_tokens {
            Some(true) => cfg.show(cfg.option_str("text").unwrap_or("OVER 200K")),
            _ => cfg.missing(),
        }
    }
}

pub struct Cost;

fn cost_state(usd: f64) -> &'static str {
    if usd >= 50.0 {
        "critical"
    } else if usd >= 20.0 {
        "high"
    } else if usd >= 10.0 {
        "elevated"
    } else {
        "normal"
    }
}

impl Widget for Cost {
    fn id(&self) -> &'static str {
        "cost"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Cost", "Session cost in USD")
            .color("bright_white")
            .state("normal", "bright_white")
            .state("elevated", "yellow")
            .state("high", "bold yellow")
            .state("critical", "bold red")
            .preview(PreviewState::status("Cheap", json!({ "cost": { "total_cost_usd": 0.42 } })))
            .preview(PreviewState::status(
                "Expensive",
                json!({ "cost": { "total_cost_usd": 61.7 } }),
            ))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let usd = ctx
            .status
            .cost
            .as_ref()
            .and_then(|c| c.total_cost_usd)
            .filter(|v| v.is_finite());
        cfg.render_with(usd, |usd| cfg.show_state(&format_cost(usd), cost_state(usd)))
    }
}

pub struct LinesChanged;

impl Widget for LinesChanged {
    fn id(&self) -> &'static str {
        "lines-changed"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Lines Changed", "Lines added and removed this session")
            .color("white")
            .state("added", "green")
            .state("removed", "red")
            .preview(PreviewState::status(
                "Edits",
                json!({ "cost": { "total_lines_added": 156, "total_lines_removed": 23 } }),
            ))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let Some(cost) = ctx.status.cost.as_ref() else {
            return cfg.missing();
        };
        if cost.total_lines_added.is_none() && cost.total_lines_removed.is_none() {
            return cfg.missing();
        }
        let added = cost.total_lines_added.unwrap_or(0);
        let removed = cost.total_lines_removed.unwrap_or(0).unsigned_abs();
        cfg.show_painted(format!(
            "{} {}",
            paint(&format!("+{added}"), cfg.state_color("added")),
            paint(&format!("-{removed}"), cfg.state_color("removed")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::cost_state;
    use crate::format::strip_ansi;
    use crate::models::{RenderContext, Settings, StatusPayload, WidgetConfig};
    use crate::widgets::render_widget;
    use serde_json::{Value, json};

    fn plain(name: &str, status: Value, cfg: Option<&WidgetConfig>) -> Option<String> {
        let ctx = RenderContext::new(StatusPayload::from_value(status), Settings::default());
        render_widget(name, &ctx, cfg).map(|s| strip_ansi(&s))
    }

    #[test]
    fn cached_tokens_with_custom_label() {
        let status = json!({ "token_metrics": { "cached_tokens": 1_500_000 } });
        let cfg = WidgetConfig::new("tokens-cached").with_label("Cached");
        assert_eq!(
            plain("tokens-cached", status, Some(&cfg)).as_deref(),
            Some("Cached: 1.5M")
        );
    }

    #[test]
    fn raw_format_and_defaults() {
        let status = json!({ "token_metrics": { "input_tokens": 48_200, "output_tokens": 7 } });
        assert_eq!(plain("tokens-input", status.clone(), None).as_deref(), Some("In: 48.2k"));
        assert_eq!(plain("tokens-output", status.clone(), None).as_deref(), Some("Out: 7"));
        let cfg = WidgetConfig::new("tokens-input").with_option("format", "raw");
        assert_eq!(plain("tokens-input", status.clone(), Some(&cfg)).as_deref(), Some("In: 48200"));
        assert_eq!(plain("tokens-total", status, None), None);
    }

    #[test]
    fn lines_removed_at_i64_min() {
        let status = json!({ "cost": { "total_lines_added": 1, "total_lines_removed": i64::MIN } });
        assert_eq!(
            plain("lines-changed", status, None).as_deref(),
            Some("+1 -9223372036854775808")
        );
        let status = json!({ "cost": { "total_lines_removed": -23 } });
        assert_eq!(plain("lines-changed", status, None).as_deref(), Some("+0 -23"));
    }

    #[test]
    fn exceeds_flag() {
        assert_eq!(
            plain("exceeds-200k", json!({ "exceeds_200k_tokens": true }), None).as_deref(),
            Some("OVER 200K")
        );
        assert_eq!(plain("exceeds-200k", json!({ "exceeds_200k_tokens": false }), None), None);
        assert_eq!(plain("exceeds-200k", json!({}), None), None);
    }

    #[test]
    fn cost_formatting() {
        let status = json!({ "cost": { "total_cost_usd": 1.234 } });
        assert_eq!(plain("cost", status, None).as_deref(), Some("$1.23"));
        assert_eq!(cost_state(0.5), "normal");
        assert_eq!(cost_state(12.0), "elevated");
        assert_eq!(cost_state(25.0), "high");
        assert_eq!(cost_state(50.0), "critical");
    }

    #[test]
    fn lines_changed() {
        let status = json!({ "cost": { "total_lines_added": 12, "total_lines_removed": -3 } });
        assert_eq!(plain("lines-changed", status, None).as_deref(), Some("+12 -3"));
        let status = json!({ "cost": { "total_cost_usd": 1.0 } });
        assert_eq!(plain("lines-changed", status, None), None);
    }
}
