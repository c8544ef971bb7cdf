use serde_json::json;

use super::{Widget, base_schema};
use crate::config::Resolved;
use crate::format::create_usage_bar;
use crate::models::{OptionDescriptor, PreviewState, RenderContext, WidgetSchema};

/// Context window headroom, colored as it runs out
pub struct ContextRemaining;

fn remaining_state(remaining: f64) -> &'static str {
    if remaining < 20.0 {
        "low"
    } else if remaining < 50.0 {
        "medium"
    } else {
        "high"
    }
}

impl Widget for ContextRemaining {
    fn id(&self) -> &'static str {
        "context"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Context", "Context window remaining")
            .label("Ctx")
            .color("green")
            .state("high", "green")
            .state("medium", "yellow")
            .state("low", "bold red")
            .option(OptionDescriptor::select(
                "display",
                "Display",
                &["remaining", "used", "bar"],
                "remaining",
            ))
            .preview(PreviewState::status(
                "Plenty left",
                json!({ "context_window": { "remaining_percentage": 72.0 } }),
            ))
            .preview(PreviewState::status(
                "Almost full",
                json!({ "context_window": { "remaining_percentage": 8.5 } }),
            ))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let remaining = ctx
            .status
            .context_window
            .as_ref()
            .and_then(|c| c.remaining_percentage)
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 100.0));
        cfg.render_with(remaining, |remaining| {
            let used = 100.0 - remaining;
            let state = remaining_state(remaining);
            match cfg.option_str("display") {
                Some("bar") => cfg.show_painted(create_usage_bar(used)),
                Some("used") => cfg.show_state(&format!("{used:.0}% used"), state),
                _ => cfg.show_state(&format!("{remaining:.0}%"), state),
            }
        })
    }
}
