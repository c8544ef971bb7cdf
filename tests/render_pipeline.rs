use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use widget_statusline::format::strip_ansi;
use widget_statusline::models::{CachedUsage, GitInfo, UsageCacheSnapshot, UsageEntry};
use widget_statusline::{
    RenderContext, Settings, StatusPayload, WidgetConfig, render_status_line, render_widget,
    widget_names, widget_schema,
};

fn ctx(status: Value, settings: Settings) -> RenderContext {
    RenderContext::new(StatusPayload::from_value(status), settings)
}

fn line(ctx: &RenderContext) -> String {
    strip_ansi(&render_status_line(ctx))
}

#[test]
fn cached_tokens_with_label() {
    let settings = Settings::with_rows(vec![vec![
        WidgetConfig::new("tokens-cached").with_label("Cached"),
    ]]);
    let ctx = ctx(json!({ "token_metrics": { "cached_tokens": 1_500_000 } }), settings);
    assert_eq!(line(&ctx), "Cached: 1.5M");
}

#[test]
fn float_counters_still_render() {
    let settings = Settings::with_rows(vec![vec![
        WidgetConfig::new("tokens-cached").with_label("Cached"),
        WidgetConfig::new("turns"),
    ]]);
    let status = json!({ "token_metrics": { "cached_tokens": 1500000.0 }, "turn_count": 3.0 });
    assert_eq!(line(&ctx(status, settings)), "Cached: 1.5M | Turns: 3");
}

#[test]
fn exceeds_200k_flag() {
    let settings = Settings::with_rows(vec![vec![WidgetConfig::new("exceeds-200k")]]);
    let on = ctx(json!({ "exceeds_200k_tokens": true }), settings.clone());
    assert_eq!(line(&on), "OVER 200K");

    let off = ctx(json!({ "exceeds_200k_tokens": false }), settings.clone());
    assert_eq!(render_widget("exceeds-200k", &off, None), None);
    let absent = ctx(json!({}), settings);
    assert_eq!(render_widget("exceeds-200k", &absent, None), None);
}

#[test]
fn hidden_widget_leaves_no_separator() {
    let settings = Settings::with_rows(vec![vec![
        WidgetConfig::new("version").with_option("prefix", ""),
        WidgetConfig::new("cost"),
    ]]);
    let ctx = ctx(json!({ "version": "A" }), settings);
    assert_eq!(line(&ctx), "A");
}

#[test]
fn hidden_widget_in_the_middle() {
    let settings = Settings::with_rows(vec![vec![
        WidgetConfig::new("model"),
        WidgetConfig::new("cost"),
        WidgetConfig::new("turns"),
    ]]);
    let ctx = ctx(json!({ "model": { "display_name": "Opus" }, "turn_count": 2 }), settings);
    assert_eq!(line(&ctx), "Opus | Turns: 2");
}

#[test]
fn unknown_widgets_are_skipped() {
    let settings = Settings::with_rows(vec![vec![
        WidgetConfig::new("model"),
        WidgetConfig::new("definitely-not-a-widget"),
        WidgetConfig::new("turns"),
    ]]);
    let ctx = ctx(json!({ "model": { "display_name": "Opus" }, "turn_count": 2 }), settings);
    assert_eq!(line(&ctx), "Opus | Turns: 2");
}

#[test]
fn na_placeholder_for_missing_branch() {
    let settings = Settings::with_rows(vec![vec![
        WidgetConfig::new("git-branch")
            .with_label("Branch")
            .with_option("naVisibility", "na"),
    ]]);
    assert_eq!(line(&ctx(json!({}), settings)), "Branch: N/A");
}

#[test]
fn multiple_rows_keep_order() {
    let settings = Settings::with_rows(vec![
        vec![WidgetConfig::new("directory").with_option("style", "full"), WidgetConfig::new("git-branch")],
        vec![],
        vec![WidgetConfig::new("context"), WidgetConfig::new("cost")],
    ]);
    let ctx = ctx(
        json!({
            "workspace": { "current_dir": "/srv/app" },
            "context_window": { "remaining_percentage": 72 },
            "cost": { "total_cost_usd": 0.5 },
        }),
        settings,
    )
    .with_git(Some(GitInfo {
        branch: Some("main".into()),
        ..GitInfo::default()
    }));
    assert_eq!(line(&ctx), "/srv/app | ⎇ main\nCtx: 72% | $0.50");
}

#[test]
fn custom_separator() {
    let mut settings = Settings::with_rows(vec![vec![
        WidgetConfig::new("model"),
        WidgetConfig::new("turns"),
    ]]);
    settings.separator = Some("::".into());
    let ctx = ctx(json!({ "model": { "id": "claude-haiku" }, "turn_count": 1 }), settings);
    assert_eq!(line(&ctx), "claude-haiku :: Turns: 1");
}

#[test]
fn empty_payload_renders_empty_line() {
    assert_eq!(line(&ctx(json!({}), Settings::default())), "");
    assert_eq!(line(&ctx(json!("not an object"), Settings::default())), "");
}

#[test]
fn wrong_types_degrade_to_no_data() {
    let status = json!({
        "model": { "display_name": 42 },
        "turn_count": "many",
        "version": "1.0.0",
    });
    let settings = Settings::with_rows(vec![vec![
        WidgetConfig::new("model"),
        WidgetConfig::new("turns"),
        WidgetConfig::new("version"),
    ]]);
    assert_eq!(line(&ctx(status, settings)), "v1.0.0");
}

#[test]
fn usage_row_from_snapshot() {
    let snapshot = UsageCacheSnapshot {
        timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap().timestamp_millis(),
        current_session: UsageEntry {
            reset_time: "2025-01-01T11:30:00Z".into(),
            percent_used: 45.0,
        },
        ..UsageCacheSnapshot::default()
    };
    let settings = Settings::with_rows(vec![vec![
        WidgetConfig::new("usage-session"),
        WidgetConfig::new("session-reset"),
        WidgetConfig::new("usage-age"),
    ]]);
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 30, 0).unwrap();
    let fresh = ctx(json!({}), settings.clone())
        .with_usage(Some(CachedUsage::fresh(snapshot.clone())))
        .at(now);
    assert_eq!(line(&fresh), "5h: █████░░░░░  45% | Resets: 1hr");

    let stale = ctx(json!({}), settings)
        .with_usage(Some(CachedUsage {
            snapshot,
            stale: true,
        }))
        .at(now);
    assert_eq!(line(&stale), "5h: █████░░░░░  45% | Resets: 1hr | Updated: 30m ago");
}

#[test]
fn schemas_serialize_for_the_gui() {
    for name in widget_names() {
        let schema = widget_schema(name).unwrap();
        let value = serde_json::to_value(schema).unwrap();
        assert_eq!(value["id"], name);
        assert!(value["options"].as_array().unwrap().iter().any(|o| o["key"] == "naVisibility"));
        assert!(value.get("previewStates").is_some());
        assert!(value.get("defaultColor").is_some());
    }
}
