//! Plugin discovery configuration.

use serde::{Deserialize, Serialize};

/// Plugin discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Root directories scanned for ghost plugin directories.
    #[serde(default = "default_directories")]
    pub directories: Vec<String>,
    /// Whether to load all discovered plugins on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
    /// Base name of the plugin module file inside each plugin directory.
    #[serde(default = "default_module_name")]
    pub module_name: String,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            directories: default_directories(),
            auto_load: default_true(),
            module_name: default_module_name(),
        }
    }
}

fn default_directories() -> Vec<String> {
    vec!["./ghosts".to_string()]
}

fn default_module_name() -> String {
    "index".to_string()
}

fn default_true() -> bool {
    true
}
