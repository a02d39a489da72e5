//! The ghost plugin manifest.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GhostError;

/// Declarative metadata identifying and describing a ghost plugin.
///
/// Parsed from `manifest.json` in the plugin directory. All fields are
/// required; a missing field fails the load of that plugin only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostManifest {
    /// Unique, stable plugin identifier.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Plugin version string.
    pub version: String,
    /// Plugin description.
    pub description: String,
    /// Author or maintainer.
    pub author: String,
    /// Global shortcut binding (e.g. `"Alt+1"`).
    pub shortcut: String,
    /// Icon path or URI.
    pub icon: String,
}

impl GhostManifest {
    /// Validates manifest invariants beyond the serde schema.
    pub fn validate(&self) -> Result<(), GhostError> {
        if self.id.trim().is_empty() {
            return Err(GhostError::manifest("manifest 'id' must be non-empty"));
        }
        Ok(())
    }

    /// Resolves a relative icon path against the plugin directory.
    ///
    /// Absolute paths, `http(s)` URIs, and embedded `data:` URIs pass
    /// through unchanged.
    pub fn resolve_icon(&mut self, plugin_dir: &Path) {
        if self.icon.is_empty()
            || self.icon.starts_with("http")
            || self.icon.starts_with("data:")
            || Path::new(&self.icon).is_absolute()
        {
            return;
        }
        self.icon = plugin_dir.join(&self.icon).to_string_lossy().into_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn manifest_json(id: &str) -> String {
        format!(
            r#"{{
                "id": "{id}",
                "name": "Miku",
                "version": "1.0.0",
                "description": "A companion ghost",
                "author": "someone",
                "shortcut": "Alt+1",
                "icon": "icon.png"
            }}"#
        )
    }

    #[test]
    fn test_parse_complete_manifest() {
        let manifest: GhostManifest =
            serde_json::from_str(&manifest_json("m1")).expect("parse");
        assert_eq!(manifest.id, "m1");
        assert_eq!(manifest.name, "Miku");
        manifest.validate().expect("valid");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let raw = r#"{"id": "m1", "name": "Miku"}"#;
        assert!(serde_json::from_str::<GhostManifest>(raw).is_err());
    }

    #[test]
    fn test_empty_id_fails_validation() {
        let manifest: GhostManifest =
            serde_json::from_str(&manifest_json(" ")).expect("parse");
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_relative_icon_is_rooted_at_plugin_dir() {
        let mut manifest: GhostManifest =
            serde_json::from_str(&manifest_json("m1")).expect("parse");
        manifest.resolve_icon(&PathBuf::from("/plugins/miku"));
        assert_eq!(manifest.icon, "/plugins/miku/icon.png");
    }

    #[test]
    fn test_uri_icons_pass_through() {
        let mut manifest: GhostManifest =
            serde_json::from_str(&manifest_json("m1")).expect("parse");

        manifest.icon = "https://example.com/icon.png".to_string();
        manifest.resolve_icon(&PathBuf::from("/plugins/miku"));
        assert_eq!(manifest.icon, "https://example.com/icon.png");

        manifest.icon = "data:image/png;base64,AAAA".to_string();
        manifest.resolve_icon(&PathBuf::from("/plugins/miku"));
        assert_eq!(manifest.icon, "data:image/png;base64,AAAA");
    }
}
