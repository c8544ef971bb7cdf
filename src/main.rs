use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use widget_statusline::cache::{UsageCacheConfig, load_usage_cache, refresh_usage_cache};
use widget_statusline::cli::Args;
use widget_statusline::format::paint;
use widget_statusline::models::{RenderContext, StatusPayload};
use widget_statusline::render::{render_status_line, widget_names, widget_schema};
use widget_statusline::settings::load_settings;
use widget_statusline::usage_api::{fetch_enabled, fetch_usage};
use widget_statusline::utils::{
    claude_paths, default_settings_path, default_usage_cache_path, read_stdin, terminal_width,
};

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    if args.list_widgets {
        for name in widget_names() {
            println!("{name}");
        }
        return Ok(());
    }

    if let Some(name) = args.schema.as_deref() {
        let Some(schema) = widget_schema(name) else {
            bail!("unknown widget '{name}'");
        };
        println!("{}", serde_json::to_string_pretty(schema)?);
        return Ok(());
    }

    let settings_path = args.settings.clone().unwrap_or_else(default_settings_path);
    let settings = load_settings(&settings_path);
    let cache_path = args.usage_cache.clone().unwrap_or_else(default_usage_cache_path);
    let cache_config = UsageCacheConfig::from_settings(cache_path, &settings);

    if args.refresh_usage {
        if !fetch_enabled() {
            bail!("usage fetching is disabled by CLAUDE_STATUSLINE_FETCH_USAGE");
        }
        let paths = claude_paths(args.claude_config_dir.as_deref());
        let snapshot = refresh_usage_cache(&cache_config, move || fetch_usage(&paths))
            .context("refresh usage cache")?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let stdin = read_stdin()?;
    if stdin.iter().all(u8::is_ascii_whitespace) {
        println!(
            "{} {}",
            paint("❯", "cyan"),
            paint("[waiting for valid input]", "dim")
        );
        return Ok(());
    }
    let status = StatusPayload::from_slice(&stdin);

    let now = Utc::now();
    let usage = load_usage_cache(&cache_config, now);
    if usage.as_ref().is_some_and(|u| u.stale) {
        debug!(path = %cache_config.path.display(), "usage cache is stale");
    }

    let git = {
        #[cfg(feature = "git")]
        {
            let dir = status
                .workspace
                .as_ref()
                .and_then(|w| w.project_dir.as_deref())
                .or_else(|| status.current_dir());
            match dir {
                Some(dir) => widget_statusline::git::read_git_info(std::path::Path::new(dir)),
                None => std::env::current_dir()
                    .ok()
                    .and_then(|d| widget_statusline::git::read_git_info(&d)),
            }
        }
        #[cfg(not(feature = "git"))]
        {
            None
        }
    };

    let width = terminal_width(args.width);
    let ctx = RenderContext::new(status, settings)
        .with_usage(usage)
        .with_git(git)
        .with_width(width)
        .at(now);

    let line = render_status_line(&ctx);
    if line.is_empty() {
        debug!("no widget produced output");
    }
    println!("{line}");
    Ok(())
}
