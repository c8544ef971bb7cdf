pub mod context;
pub mod git;
pub mod schema;
pub mod settings;
pub mod status;
pub mod usage;

pub use context::RenderContext;
pub use git::GitInfo;
pub use schema::{OptionDescriptor, OptionKind, PreviewState, StateColor, WidgetSchema};
pub use settings::{ColorValue, Settings, WidgetConfig};
pub use status::StatusPayload;
pub use usage::{CachedUsage, UsageCacheSnapshot, UsageEntry};
