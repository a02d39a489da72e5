//! Host configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod plugins;
pub mod switching;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::plugins::PluginsConfig;
pub use self::switching::SwitchingConfig;

use crate::error::GhostError;

/// Root host configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Plugin discovery settings.
    #[serde(default)]
    pub plugins: PluginsConfig,
    /// Switch protocol settings.
    #[serde(default)]
    pub switching: SwitchingConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HostConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `GHOSTHUB__`.
    pub fn load(env: &str) -> Result<Self, GhostError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GHOSTHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| GhostError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| GhostError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = HostConfig::default();
        assert_eq!(config.plugins.module_name, "index");
        assert_eq!(config.switching.settle_delay_ms, 100);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_toml_deserializes_with_defaults() {
        let config: HostConfig = toml_from_str("");
        assert!(config.plugins.auto_load);
        assert_eq!(config.switching.hook_timeout_secs, 30);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: HostConfig = toml_from_str("[switching]\nsettle_delay_ms = 250\n");
        assert_eq!(config.switching.settle_delay_ms, 250);
        assert_eq!(config.switching.hook_timeout_secs, 30);
    }

    fn toml_from_str(raw: &str) -> HostConfig {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize")
    }
}
