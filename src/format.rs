//! # Formatter
//!
//! Stateless helpers shared by every widget: ANSI coloring driven by
//! user-supplied color strings, and the numeric formats the status line
//! relies on (tokens, durations, cost, usage bars).

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::env;

#[cfg(feature = "colors")]
use owo_colors::{AnsiColors, DynColors, OwoColorize, Style};

pub const BAR_CELLS: usize = 10;
const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';
const ELLIPSIS: char = '…';

static ANSI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

static COLORS_ENABLED: Lazy<bool> = Lazy::new(|| env::var_os("NO_COLOR").is_none());

/// Whether ANSI output is enabled (`NO_COLOR` unset and the `colors` feature on)
pub fn colors_enabled() -> bool {
    cfg!(feature = "colors") && *COLORS_ENABLED
}

/// Apply a color spec such as `"red"`, `"dim"`, `"bold #ff8800"`.
/// Unknown tokens are ignored; an empty spec returns the text unchanged.
pub fn paint(text: &str, spec: &str) -> String {
    if text.is_empty() || !colors_enabled() {
        return text.to_string();
    }
    paint_styled(text, spec)
}

#[cfg(feature = "colors")]
fn paint_styled(text: &str, spec: &str) -> String {
    let mut style = Style::new();
    let mut touched = false;
    for token in spec_tokens(spec) {
        match token.as_str() {
            "dim" | "dimmed" => style = style.dimmed(),
            "bold" => style = style.bold(),
            "italic" => style = style.italic(),
            "underline" => style = style.underline(),
            other => match parse_color(other) {
                Some(color) => style = style.color(color),
                None => continue,
            },
        }
        touched = true;
    }
    if !touched {
        return text.to_string();
    }
    text.style(style).to_string()
}

#[cfg(not(feature = "colors"))]
fn paint_styled(text: &str, _spec: &str) -> String {
    text.to_string()
}

/// Normalize `"bright blue"`, `"brightBlue"` and `"bright_blue"` to `bright_blue`.
fn spec_tokens(spec: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending_bright = false;
    for raw in spec.split(|c: char| c.is_whitespace() || c == '+' || c == ',') {
        if raw.is_empty() {
            continue;
        }
        if raw.starts_with('#') {
            tokens.push(raw.to_ascii_lowercase());
            continue;
        }
        let mut token = String::with_capacity(raw.len() + 1);
        for (i, ch) in raw.chars().enumerate() {
            if ch.is_ascii_uppercase() && i > 0 {
                token.push('_');
            }
            token.push(if ch == '-' { '_' } else { ch.to_ascii_lowercase() });
        }
        if token == "bright" {
            pending_bright = true;
            continue;
        }
        if pending_bright {
            token = format!("bright_{token}");
            pending_bright = false;
        }
        tokens.push(token);
    }
    tokens
}

#[cfg(feature = "colors")]
fn parse_color(token: &str) -> Option<DynColors> {
    if let Some(hex) = token.strip_prefix('#') {
        return parse_hex(hex).map(|(r, g, b)| DynColors::Rgb(r, g, b));
    }
    let ansi = match token {
        "black" => AnsiColors::Black,
        "red" => AnsiColors::Red,
        "green" => AnsiColors::Green,
        "yellow" => AnsiColors::Yellow,
        "blue" => AnsiColors::Blue,
        "magenta" | "purple" => AnsiColors::Magenta,
        "cyan" => AnsiColors::Cyan,
        "white" => AnsiColors::White,
        "gray" | "grey" | "bright_black" => AnsiColors::BrightBlack,
        "bright_red" => AnsiColors::BrightRed,
        "bright_green" => AnsiColors::BrightGreen,
        "bright_yellow" => AnsiColors::BrightYellow,
        "bright_blue" => AnsiColors::BrightBlue,
        "bright_magenta" => AnsiColors::BrightMagenta,
        "bright_cyan" => AnsiColors::BrightCyan,
        "bright_white" => AnsiColors::BrightWhite,
        "default" => AnsiColors::Default,
        _ => return None,
    };
    Some(DynColors::Ansi(ansi))
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

pub fn strip_ansi(s: &str) -> String {
    ANSI_RE.replace_all(s, "").into_owned()
}

/// Printable character count, ignoring ANSI escapes
pub fn visible_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/// Cut `s` to at most `width` visible characters, ending with `…` when cut.
/// Escape sequences are kept intact and a reset is appended after a cut.
pub fn truncate_visible(s: &str, width: usize) -> String {
    if width == 0 || visible_width(s) <= width {
        return s.to_string();
    }
    let keep = width - 1;
    let mut out = String::with_capacity(s.len());
    let mut shown = 0usize;
    let mut last = 0usize;
    for m in ANSI_RE.find_iter(s) {
        let plain = &s[last..m.start()];
        if !push_visible(&mut out, plain, keep, &mut shown) {
            return finish_truncated(out);
        }
        out.push_str(m.as_str());
        last = m.end();
    }
    push_visible(&mut out, &s[last..], keep, &mut shown);
    finish_truncated(out)
}

fn push_visible(out: &mut String, plain: &str, keep: usize, shown: &mut usize) -> bool {
    for ch in plain.chars() {
        if *shown >= keep {
            return false;
        }
        out.push(ch);
        *shown += 1;
    }
    true
}

fn finish_truncated(mut out: String) -> String {
    out.push(ELLIPSIS);
    if colors_enabled() {
        out.push_str("\x1b[0m");
    }
    out
}

/// `1_500_000 -> "1.5M"`, `1_500 -> "1.5k"`, `999 -> "999"`
pub fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}k", n as f64 / 1e3)
    } else {
        n.to_string()
    }
}

/// Milliseconds to `"<1m"`, `"45m"`, `"3hr"`, `"2hr 15m"`.
pub fn format_duration(ms: u64) -> String {
    let total_minutes = ms / 60_000;
    if total_minutes == 0 {
        return "<1m".to_string();
    }
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}hr"),
        (h, m) => format!("{h}hr {m}m"),
    }
}

pub fn format_cost(usd: f64) -> String {
    format!("${usd:.2}")
}

pub fn format_path(p: &str) -> String {
    if let Some(b) = directories::BaseDirs::new() {
        let home_s = b.home_dir().to_string_lossy();
        if !home_s.is_empty() && p.starts_with(&*home_s) {
            let rest = &p[home_s.len()..];
            if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') {
                return format!("~{rest}");
            }
        }
    }
    p.to_owned()
}

/// Time remaining until `reset`, formatted like [`format_duration`].
/// `None` for unparseable timestamps; a reset already passed yields `"now"`.
pub fn format_countdown(reset: &str, now: DateTime<Utc>) -> Option<String> {
    let reset = DateTime::parse_from_rfc3339(reset.trim())
        .ok()?
        .with_timezone(&Utc);
    let remaining = (reset - now).num_milliseconds();
    if remaining <= 0 {
        return Some("now".to_string());
    }
    Some(format_duration(remaining as u64))
}

fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// Threshold color for a usage percentage
pub fn usage_color(percent: f64) -> &'static str {
    let p = clamp_percent(percent);
    if p < 50.0 {
        "green"
    } else if p < 80.0 {
        "yellow"
    } else {
        "red"
    }
}

pub fn filled_cells(percent: f64) -> usize {
    let cells = (clamp_percent(percent) / 10.0).ceil() as usize;
    cells.min(BAR_CELLS)
}

/// Ten-cell bar followed by the percentage padded to three characters,
/// e.g. `"█████░░░░░  45%"`.
pub fn create_usage_bar(percent: f64) -> String {
    let p = clamp_percent(percent);
    let filled = filled_cells(p);
    let color = usage_color(p);
    let bar_on: String = std::iter::repeat_n(BAR_FILLED, filled).collect();
    let bar_off: String = std::iter::repeat_n(BAR_EMPTY, BAR_CELLS - filled).collect();
    let text = format!("{:>3}%", p.round() as u64);
    format!(
        "{}{} {}",
        paint(&bar_on, color),
        paint(&bar_off, "dim"),
        paint(&text, color)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn tokens_below_thousand_are_raw() {
        for n in [0u64, 1, 42, 999] {
            assert_eq!(format_tokens(n), n.to_string());
        }
    }

    #[test]
    fn tokens_boundaries() {
        assert_eq!(format_tokens(1_000), "1.0k");
        assert_eq!(format_tokens(1_500), "1.5k");
        assert_eq!(format_tokens(999_999), "1000.0k");
        assert_eq!(format_tokens(1_000_000), "1.0M");
        assert_eq!(format_tokens(1_500_000), "1.5M");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(0), "<1m");
        assert_eq!(format_duration(59_999), "<1m");
        assert_eq!(format_duration(45 * 60_000), "45m");
        assert_eq!(format_duration(3 * 60 * 60_000), "3hr");
        assert_eq!(format_duration(2 * 60 * 60_000 + 15 * 60_000), "2hr 15m");
    }

    #[test]
    fn cost_two_decimals() {
        assert_eq!(format_cost(0.0), "$0.00");
        assert_eq!(format_cost(1.234), "$1.23");
        assert_eq!(format_cost(12.5), "$12.50");
    }

    #[test]
    fn usage_bar_clamps() {
        assert_eq!(create_usage_bar(-10.0), create_usage_bar(0.0));
        assert_eq!(create_usage_bar(150.0), create_usage_bar(100.0));
        assert_eq!(create_usage_bar(f64::NAN), create_usage_bar(0.0));
    }

    #[test]
    fn usage_bar_cells() {
        assert_eq!(filled_cells(0.0), 0);
        assert_eq!(filled_cells(0.1), 1);
        assert_eq!(filled_cells(10.0), 1);
        assert_eq!(filled_cells(45.0), 5);
        assert_eq!(filled_cells(100.0), 10);
        assert_eq!(filled_cells(1000.0), 10);

        let plain = strip_ansi(&create_usage_bar(45.0));
        assert_eq!(plain, "█████░░░░░  45%");
        let plain = strip_ansi(&create_usage_bar(100.0));
        assert_eq!(plain, "██████████ 100%");
    }

    #[test]
    fn usage_thresholds() {
        assert_eq!(usage_color(49.9), "green");
        assert_eq!(usage_color(50.0), "yellow");
        assert_eq!(usage_color(79.9), "yellow");
        assert_eq!(usage_color(80.0), "red");
    }

    #[test]
    fn spec_tokens_normalize() {
        assert_eq!(spec_tokens("brightBlue"), vec!["bright_blue"]);
        assert_eq!(spec_tokens("bright blue"), vec!["bright_blue"]);
        assert_eq!(spec_tokens("bold red"), vec!["bold", "red"]);
        assert_eq!(spec_tokens("bright-red"), vec!["bright_red"]);
        assert_eq!(spec_tokens("bold #FF8800"), vec!["bold", "#ff8800"]);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex("ff8800"), Some((255, 136, 0)));
        assert_eq!(parse_hex("fff"), None);
        assert_eq!(parse_hex("zzzzzz"), None);
    }

    #[test]
    fn strip_and_truncate() {
        let colored = "\x1b[31mhello\x1b[0m world";
        assert_eq!(strip_ansi(colored), "hello world");
        assert_eq!(visible_width(colored), 11);
        assert_eq!(truncate_visible(colored, 0), colored);
        assert_eq!(truncate_visible(colored, 20), colored);
        let cut = truncate_visible(colored, 6);
        assert_eq!(strip_ansi(&cut), "hello…");
        assert!(cut.starts_with("\x1b[31m"));
    }

    #[test]
    fn countdown() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(
            format_countdown("2025-01-01T12:15:00Z", now).as_deref(),
            Some("2hr 15m")
        );
        assert_eq!(
            format_countdown("2025-01-01T09:00:00+00:00", now).as_deref(),
            Some("now")
        );
        assert_eq!(format_countdown("not a date", now), None);
        assert_eq!(format_countdown("", now), None);
    }
}
