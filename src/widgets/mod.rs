//! # Widgets
//!
//! The closed set of status line widgets. Each widget is a pure function of
//! the [`RenderContext`] and its resolved configuration; none of them touch
//! the network or the filesystem.
//!
//! The registry keeps declaration order (used for the implicit default row)
//! and a hash index for O(1) lookup by id.

pub mod context;
pub mod session;
pub mod tokens;
pub mod usage;
pub mod workspace;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::config::{NA_VISIBILITY_KEY, NaVisibility, Resolved};
use crate::format::strip_ansi;
use crate::models::{OptionDescriptor, RenderContext, WidgetConfig, WidgetSchema};

/// One renderable widget.
pub trait Widget: Send + Sync {
    fn id(&self) -> &'static str;

    /// Static metadata; built once when the registry is first used
    fn schema(&self) -> WidgetSchema;

    /// `None` means the widget contributes nothing to the line.
    fn render(&self, ctx: &RenderContext, cfg: &Resolved<'_>) -> Option<String>;
}

/// Schema skeleton carrying the options every widget shares
pub(crate) fn base_schema(
    id: &'static str,
    name: &'static str,
    description: &'static str,
) -> WidgetSchema {
    WidgetSchema::new(id, name, description).option(OptionDescriptor::select(
        NA_VISIBILITY_KEY,
        "When there is no data",
        &NaVisibility::CHOICES,
        NaVisibility::Hide.as_str(),
    ))
}

static WIDGETS: &[&dyn Widget] = &[
    &workspace::Directory,
    &workspace::GitBranch,
    &workspace::GitStatus,
    &session::Model,
    &session::OutputStyleWidget,
    &session::VimMode,
    &context::ContextRemaining,
    &tokens::Exceeds200k,
    &tokens::TOKENS_INPUT,
    &tokens::TOKENS_OUTPUT,
    &tokens::TOKENS_CACHED,
    &tokens::TOKENS_TOTAL,
    &tokens::Cost,
    &tokens::LinesChanged,
    &session::Turns,
    &session::SessionDuration,
    &session::SessionId,
    &session::Version,
    &usage::USAGE_SESSION,
    &usage::SESSION_RESET,
    &usage::USAGE_WEEKLY,
    &usage::WEEKLY_RESET,
    &usage::USAGE_SONNET,
    &usage::UsageAge,
];

struct Registration {
    widget: &'static dyn Widget,
    schema: WidgetSchema,
}

struct Registry {
    entries: Vec<Registration>,
    index: HashMap<&'static str, usize>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let entries: Vec<Registration> = WIDGETS
        .iter()
        .map(|w| Registration {
            widget: *w,
            schema: w.schema(),
        })
        .collect();
    let index = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.widget.id(), i))
        .collect();
    Registry { entries, index }
});

fn lookup(name: &str) -> Option<&'static Registration> {
    let registry: &'static Registry = &REGISTRY;
    registry.index.get(name).map(|&i| &registry.entries[i])
}

/// Widget ids in declaration order
pub fn widget_names() -> Vec<&'static str> {
    REGISTRY.entries.iter().map(|e| e.widget.id()).collect()
}

pub fn widget_schema(name: &str) -> Option<&'static WidgetSchema> {
    lookup(name).map(|e| &e.schema)
}

pub fn widget_schemas() -> Vec<&'static WidgetSchema> {
    REGISTRY.entries.iter().map(|e| &e.schema).collect()
}

pub fn is_known(name: &str) -> bool {
    REGISTRY.index.contains_key(name)
}

/// Render one widget in isolation. Unknown ids and empty output yield `None`.
pub fn render_widget(
    name: &str,
    ctx: &RenderContext,
    config: Option<&WidgetConfig>,
) -> Option<String> {
    let entry = lookup(name)?;
    let resolved = Resolved::new(&entry.schema, config);
    entry
        .widget
        .render(ctx, &resolved)
        .filter(|out| !strip_ansi(out).is_empty())
}
