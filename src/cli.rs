use std::path::PathBuf;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(clap::Parser, Debug)]
#[command(version, about = "Widget-based status line for Claude Code")]
pub struct Args {
    /// Widget layout file. Defaults to ~/.claude/statusline-widgets.json
    #[arg(long, env = "CLAUDE_STATUSLINE_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Usage cache file. Defaults to ~/.claude/statusline-usage.json
    #[arg(long, env = "CLAUDE_STATUSLINE_USAGE_CACHE")]
    pub usage_cache: Option<PathBuf>,

    /// Truncate each row to this many columns (0 = never). Defaults to the terminal width
    #[arg(long, env = "CLAUDE_STATUSLINE_WIDTH")]
    pub width: Option<usize>,

    /// Fetch usage limits, rewrite the cache and exit
    #[arg(long)]
    pub refresh_usage: bool,

    /// Print the available widget ids and exit
    #[arg(long)]
    pub list_widgets: bool,

    /// Print one widget's schema as JSON and exit
    #[arg(long, value_name = "WIDGET")]
    pub schema: Option<String>,

    /// Claude data path(s) for credentials, comma-separated
    #[arg(long, env = "CLAUDE_CONFIG_DIR")]
    pub claude_config_dir: Option<String>,

    /// Log level on stderr; RUST_LOG takes precedence
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Shorthand for --log-level debug
    #[arg(long, env = "CLAUDE_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }

    /// Effective log filter: explicit level, then `--debug`, then warn
    pub fn log_filter(&self) -> &'static str {
        match (self.log_level, self.debug) {
            (Some(level), _) => level.as_filter(),
            (None, true) => "debug",
            (None, false) => "warn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn log_filter_precedence() {
        let args = Args::try_parse_from(["widget-statusline"]).unwrap();
        assert_eq!(args.log_filter(), "warn");

        let args = Args::try_parse_from(["widget-statusline", "--debug"]).unwrap();
        assert_eq!(args.log_filter(), "debug");

        let args =
            Args::try_parse_from(["widget-statusline", "--debug", "--log-level", "error"]).unwrap();
        assert_eq!(args.log_filter(), "error");
    }

    #[test]
    fn schema_and_width() {
        let args =
            Args::try_parse_from(["widget-statusline", "--schema", "context", "--width", "80"])
                .unwrap();
        assert_eq!(args.schema.as_deref(), Some("context"));
        assert_eq!(args.width, Some(80));
    }
}
