//! Directory and git widgets.

use serde_json::json;
use std::path::Path;

use super::{Widget, base_schema};
use crate::config::Resolved;
use crate::format::{format_path, paint};
use crate::models::{OptionDescriptor, PreviewState, RenderContext, WidgetSchema};

pub struct Directory;

impl Widget for Directory {
    fn id(&self) -> &'static str {
        "directory"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Directory", "Current working directory")
            .color("bright_blue")
            .option(OptionDescriptor::select(
                "style",
                "Path style",
                &["home", "full", "basename"],
                "home",
            ))
            .preview(PreviewState::status(
                "Project",
                json!({ "workspace": { "current_dir": "/home/dev/projects/statusline" } }),
            ))
            .preview(PreviewState::status("Root", json!({ "cwd": "/" })))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        cfg.render_with(ctx.status.current_dir(), |dir| {
            let text = match cfg.option_str("style").unwrap_or("home") {
                "full" => dir.to_string(),
                "basename" => Path::new(dir)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| dir.to_string()),
                _ => format_path(dir),
            };
            cfg.show(&text)
        })
    }
}

pub struct GitBranch;

impl Widget for GitBranch {
    fn id(&self) -> &'static str {
        "git-branch"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Git Branch", "Checked-out branch, or the commit when detached")
            .color("magenta")
            .option(OptionDescriptor::text("icon", "Icon", "⎇").max_length(4))
            .option(OptionDescriptor::checkbox("showCommit", "Show short commit", false))
            .preview(PreviewState::git(
                "Branch",
                json!({ "branch": "main", "short_commit": "a1b2c3d" }),
            ))
            .preview(PreviewState::git(
                "Detached",
                json!({ "short_commit": "9f8e7d6" }),
            ))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let git = ctx.git.as_ref();
        let branch = git.and_then(|g| g.branch.as_deref());
        let commit = git.and_then(|g| g.short_commit.as_deref());
        let name = match (branch, commit) {
            (Some(b), Some(c)) if cfg.option_bool("showCommit") => format!("{b}@{c}"),
            (Some(b), _) => b.to_string(),
            (None, Some(c)) => format!("detached@{c}"),
            (None, None) => return cfg.missing(),
        };
        let text = match cfg.option_str("icon").map(str::trim) {
            Some(icon) if !icon.is_empty() => format!("{icon} {name}"),
            _ => name,
        };
        cfg.show(&text)
    }
}

pub struct GitStatus;

impl Widget for GitStatus {
    fn id(&self) -> &'static str {
        "git-status"
    }

    fn schema(&self) -> WidgetSchema {
        base_schema(self.id(), "Git Status", "Dirty marker and ahead/behind counts")
            .color("white")
            .state("clean", "green")
            .state("dirty", "yellow")
            .state("ahead", "green")
            .state("behind", "red")
            .option(OptionDescriptor::checkbox("showClean", "Show clean marker", true))
            .preview(PreviewState::git(
                "Dirty, ahead",
                json!({ "branch": "main", "is_clean": false, "ahead": 2, "behind": 0 }),
            ))
            .preview(PreviewState::git(
                "Clean",
                json!({ "branch": "main", "is_clean": true, "ahead": 0, "behind": 0 }),
            ))
    }

    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String> {
        let Some(git) = ctx.git.as_ref() else {
            return cfg.missing();
        };
        let mut parts: Vec<String> = Vec::new();
        match git.is_clean {
            Some(false) => parts.push(paint("*", cfg.state_color("dirty"))),
            Some(true) if cfg.option_bool("showClean") => {
                parts.push(paint("✓", cfg.state_color("clean")))
            }
            _ => {}
        }
        if let Some(a) = git.ahead.filter(|a| *a > 0) {
            parts.push(paint(&format!("↑{a}"), cfg.state_color("ahead")));
        }
        if let Some(b) = git.behind.filter(|b| *b > 0) {
            parts.push(paint(&format!("↓{b}"), cfg.state_color("behind")));
        }
        if parts.is_empty() {
            return cfg.missing();
        }
        cfg.show_painted(parts.join(" "))
    }
}
