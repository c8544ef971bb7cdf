//! # Render Pipeline
//!
//! Turns a [`RenderContext`] into the final status text. Each configured row
//! is rendered widget by widget; widgets that produce nothing leave no trace,
//! the survivors are joined with the separator, empty rows are dropped and
//! the remaining rows are joined with newlines.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tracing::debug;

use crate::format::{paint, truncate_visible};
use crate::models::{
    CachedUsage, GitInfo, RenderContext, Settings, StatusPayload, UsageCacheSnapshot, WidgetConfig,
};

pub use crate::widgets::{render_widget, widget_names, widget_schema, widget_schemas};

/// How far past the fetch instant a preview marked `stale` is rendered
const STALE_PREVIEW_AGE_MIN: i64 = 15;

/// Render every row of the status line.
pub fn render_status_line(ctx: &RenderContext) -> String {
    let rows: Vec<String> = match ctx.settings.rows.as_deref() {
        Some(rows) => rows
            .iter()
            .map(|row| render_row(ctx, row.iter().map(|c| (c.widget.as_str(), Some(c)))))
            .collect(),
        None => vec![render_row(ctx, widget_names().into_iter().map(|name| (name, None)))],
    };

    rows.into_iter()
        .filter(|row| !row.is_empty())
        .map(|row| truncate_visible(&row, ctx.terminal_width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one row; unknown widgets are skipped without using a separator slot.
pub fn render_row<'a>(
    ctx: &RenderContext,
    widgets: impl IntoIterator<Item = (&'a str, Option<&'a WidgetConfig>)>,
) -> String {
    let parts: Vec<String> = widgets
        .into_iter()
        .filter_map(|(name, config)| {
            let out = render_widget(name, ctx, config);
            if out.is_none() && !crate::widgets::is_known(name) {
                debug!(widget = name, "skipping unknown widget");
            }
            out
        })
        .collect();
    parts.join(&separator(&ctx.settings))
}

fn separator(settings: &Settings) -> String {
    let text = settings.separator_text();
    if text.is_empty() {
        return " ".to_string();
    }
    let color = settings
        .separator_color
        .as_ref()
        .map(|c| c.as_str())
        .unwrap_or("dim");
    format!(" {} ", paint(text, color))
}

/// Context built from one of a widget's preview fixtures.
///
/// Usage fixtures are rendered at their own fetch instant, or
/// [`STALE_PREVIEW_AGE_MIN`] minutes later when they carry `"stale": true`.
pub fn preview_context(name: &str, state_label: &str) -> Option<RenderContext> {
    let schema = widget_schema(name)?;
    let state = schema.preview_state(state_label)?;

    let status = StatusPayload::from_value(state.status.clone());
    let git = state
        .git
        .clone()
        .and_then(|v| serde_json::from_value::<GitInfo>(v).ok());
    let mut ctx = RenderContext::new(status, Settings::default()).with_git(git);

    if let Some(fixture) = &state.usage {
        let snapshot: UsageCacheSnapshot = serde_json::from_value(fixture.clone()).ok()?;
        let stale = fixture.get("stale").and_then(Value::as_bool).unwrap_or(false);
        let fetched = DateTime::<Utc>::from_timestamp_millis(snapshot.timestamp)?;
        let now = if stale {
            fetched + TimeDelta::minutes(STALE_PREVIEW_AGE_MIN)
        } else {
            fetched
        };
        ctx = ctx
            .with_usage(Some(CachedUsage { snapshot, stale }))
            .at(now);
    }
    Some(ctx)
}
