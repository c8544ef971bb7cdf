//! Usage-limit widgets backed by the cached usage snapshot.

use chrono::{DateTime, Local};
use serde_json::{Value, json};

use super::{Widget, base_schema};
use crate::config::Resolved;
use crate::format::{create_usage_bar, format_countdown, format_duration, paint, usage_color};
use crate::models::{
    OptionDescriptor, PreviewState, RenderContext, UsageCacheSnapshot, UsageEntry, WidgetSchema,
};

fn usage_state(percent: f64) -> &'static str {
    match usage_color(percent) {
        "green" => "low",
        "yellow" => "medium",
        _ => "high",
    }
}

fn preview_snapshot() -> Value {
    json!({
        "timestamp": 1_735_725_600_000i64,
        "current_session": { "reset_time": "2025-01-01T12:15:00Z", "percent_used": 37.0 },
        "weekly_all": { "reset_time": "2025-01-05T08:00:00Z", "percent_used": 64.0 },
        "weekly_sonnet": { "reset_time": "2025-01-05T08:00:00Z", "percent_used": 88.0 },
    })
}

fn entry<'a>(
    ctx: &'a RenderContext,
    pick: fn(&UsageCacheSnapshot) -> &UsageEntry,
) -> Option<&'a UsageEntry> {
    ctx.usage.as_ref().map(|u| pick(&u.snapshot))
}

/// Percent used for one limit window
pub struct UsagePercent {
    id: &'static str,
    name: &'static str,
    label: &'static str,
    description: &'static str,
    pick: fn(&UsageCacheSnapshot) -> &UsageEntry,
}

pub static USAGE_SESSION: UsagePercent = UsagePercent {
    id: "usage-session",
    name: "Session Usage",
    label: "5h",
    description: "Share of the five-hour session limit used",
    pick: |s| &s.current_session,
};

pub static USAGE_WEEKLY: UsagePercent = UsagePercent {
    id: "usage-weekly",
    name: "Weekly Usage",
    label: "Week",
    description: "Share of the weekly limit used across all models",
    pick: |s| &s.weekly_all,
};

pub static USAGE_SONNET: UsagePercent = UsagePercent {
    id: "usage-sonnet",
    name: "Weekly Sonnet Usage",
    label: "Sonnet",
    description: "Share of the weekly Sonnet limit used",
    pick: |s| &s.weekly_sonnet,
};

impl Widget for UsagePercent {
    fn id(&self) -> &'static str {
        self.id
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id, self.name, self.description)
            .label(self.label)
            .color("white")
            .state("low", "green")
            .state("medium", "yellow")
            .state("high", "red")
            .option(OptionDescriptor::select(
                "display",
                "Display",
                &["bar", "percent"],
                "bar",
            ))
            .option(OptionDescriptor::checkbox("showReset", "Append reset countdown", false))
            .option(OptionDescriptor::color("resetColor", "Countdown color", "dim"))
            .preview(PreviewState::usage("Cached", preview_snapshot()))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        cfg.render_with(entry(ctx, self.pick), |e| {
            let percent = if e.percent_used.is_finite() {
                e.percent_used.clamp(0.0, 100.0)
            } else {
                0.0
            };
            let mut out = match cfg.option_str("display") {
                Some("percent") => paint(
                    &format!("{percent:.0}%"),
                    cfg.state_color(usage_state(percent)),
                ),
                _ => create_usage_bar(percent),
            };
            if cfg.option_bool("showReset") {
                if let Some(left) = format_countdown(&e.reset_time, ctx.now) {
                    out.push(' ');
                    let color = cfg.option_str("resetColor").unwrap_or("dim");
                    out.push_str(&paint(&format!("↻{left}"), color));
                }
            }
            cfg.show_painted(out)
        })
    }
}

/// Time until a limit window resets
pub struct ResetTimer {
    id: &'static str,
    name: &'static str,
    label: &'static str,
    description: &'static str,
    clock_format: &'static str,
    pick: fn(&UsageCacheSnapshot) -> &UsageEntry,
}

pub static SESSION_RESET: ResetTimer = ResetTimer {
    id: "session-reset",
    name: "Session Reset",
    label: "Resets",
    description: "When the five-hour session limit resets (clock display uses the local time zone)",
    clock_format: "%H:%M",
    pick: |s| &s.current_session,
};

pub static WEEKLY_RESET: ResetTimer = ResetTimer {
    id: "weekly-reset",
    name: "Weekly Reset",
    label: "Week resets",
    description: "When the weekly limit resets (clock display uses the local time zone)",
    clock_format: "%a %H:%M",
    pick: |s| &s.weekly_all,
};

impl Widget for ResetTimer {
    fn id(&self) -> &'static str {
        self.id
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id, self.name, self.description)
            .label(self.label)
            .color("white")
            .option(OptionDescriptor::select(
                "display",
                "Display",
                &["countdown", "clock"],
                "countdown",
            ))
            .preview(PreviewState::usage("Cached", preview_snapshot()))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let reset = entry(ctx, self.pick).map(|e| e.reset_time.as_str());
        let text = match cfg.option_str("display") {
            Some("clock") => reset
                .and_then(|r| DateTime::parse_from_rfc3339(r.trim()).ok())
                .map(|r| r.with_timezone(&Local).format(self.clock_format).to_string()),
            _ => reset.and_then(|r| format_countdown(r, ctx.now)),
        };
        cfg.render_with(text, |t| cfg.show(&t))
    }
}

/// Age of the usage snapshot, shown once it has gone stale
pub struct UsageAge;

impl Widget for UsageAge {
    fn id(&self) -> &'static str {
        "usage-age"
    }

    fn schema(&self) -> WidgetSchema {
        let mut stale = preview_snapshot();
        stale["stale"] = json!(true);
        base_schema(self.id(), "Usage Age", "How old the cached usage data is")
            .label("Updated")
            .color("yellow")
            .option(OptionDescriptor::checkbox("always", "Show even when fresh", false))
            .preview(PreviewState::usage("Stale", stale))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let usage = ctx
            .usage
            .as_ref()
            .filter(|u| u.stale || cfg.option_bool("always"));
        cfg.render_with(usage, |u| {
            let age = u.age_ms(ctx.now.timestamp_millis());
            cfg.show(&format!("{} ago", format_duration(age as u64)))
        })
    }
}
