use serde::{Deserialize, Serialize};

/// Repository state as resolved before rendering
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitInfo {
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub short_commit: Option<String>,
    #[serde(default)]
    pub is_clean: Option<bool>,
    #[serde(default)]
    pub ahead: Option<usize>,
    #[serde(default)]
    pub behind: Option<usize>,
}
