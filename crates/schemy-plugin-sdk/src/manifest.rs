use serde::{Deserialize, Serialize};

/// On-disk JSON manifest located next to each plugin artifact, and the
/// descriptor record handed to `plugins_initialized`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PluginManifest {
    pub plugin_name: String,
    pub version: String,
    pub required_version: String,
    pub description: Option<String>,
    pub capabilities: Vec<String>,
}

impl PluginManifest {
    /// Whether the plugin declares the given hook.
    pub fn implements(&self, hook: &str) -> bool {
        self.capabilities.iter().any(|c| c == hook)
    }
}
