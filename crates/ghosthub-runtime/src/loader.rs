//! Manifest discovery over the host bridge.
//!
//! Discovery is best-effort: a broken plugin directory (missing or
//! malformed manifest) is logged and skipped, never fatal to the scan.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use ghosthub_core::error::GhostError;
use ghosthub_core::manifest::GhostManifest;
use ghosthub_core::traits::host::HostBridge;

/// Manifest file name inside every plugin directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// A plugin directory whose manifest parsed and validated.
#[derive(Debug, Clone)]
pub struct DiscoveredGhost {
    /// The plugin's directory.
    pub dir: PathBuf,
    /// The parsed manifest, icon path already resolved.
    pub manifest: GhostManifest,
}

/// Scans the host's plugin roots for valid ghost manifests.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    bridge: Arc<dyn HostBridge>,
}

impl ManifestLoader {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }

    /// Scans every plugin root and returns all valid plugin directories.
    ///
    /// Per-entry failures are skipped with a warning. When the host cannot
    /// even enumerate its roots the scan yields an empty list; an empty
    /// plugin set is a valid state, not an error.
    pub async fn discover(&self) -> Vec<DiscoveredGhost> {
        let roots = match self.bridge.plugin_roots().await {
            Ok(roots) => roots,
            Err(e) => {
                warn!(error = %e, "failed to enumerate plugin roots");
                return Vec::new();
            }
        };

        let mut discovered = Vec::new();
        for root in roots {
            let entries = match self.bridge.list_entries(&root).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "failed to list plugin root");
                    continue;
                }
            };

            for entry in entries {
                if !entry.is_directory {
                    continue;
                }
                let dir = root.join(&entry.name);
                match self.load_manifest(&dir).await {
                    Ok(manifest) => {
                        debug!(
                            ghost_id = %manifest.id,
                            dir = %dir.display(),
                            "discovered ghost"
                        );
                        discovered.push(DiscoveredGhost { dir, manifest });
                    }
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "skipping plugin directory");
                    }
                }
            }
        }
        discovered
    }

    /// Reads, validates, and icon-resolves one plugin directory's manifest.
    pub async fn load_manifest(&self, dir: &Path) -> Result<GhostManifest, GhostError> {
        let path = dir.join(MANIFEST_FILE);
        let mut manifest = self.bridge.read_manifest(&path).await?;
        manifest.validate()?;
        manifest.resolve_icon(dir);
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    use async_trait::async_trait;

    use ghosthub_core::traits::host::DirEntryInfo;

    /// In-memory bridge serving canned directory listings and manifests.
    #[derive(Debug, Default)]
    struct MapBridge {
        roots: Vec<PathBuf>,
        manifests: HashMap<PathBuf, String>,
    }

    impl MapBridge {
        fn with_plugin(mut self, root: &str, name: &str, manifest_json: &str) -> Self {
            let root = PathBuf::from(root);
            if !self.roots.contains(&root) {
                self.roots.push(root.clone());
            }
            self.manifests.insert(
                root.join(name).join(MANIFEST_FILE),
                manifest_json.to_string(),
            );
            self
        }
    }

    #[async_trait]
    impl HostBridge for MapBridge {
        async fn plugin_roots(&self) -> Result<Vec<PathBuf>, GhostError> {
            Ok(self.roots.clone())
        }

        async fn list_entries(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, GhostError> {
            let mut names: Vec<String> = self
                .manifests
                .keys()
                .filter_map(|p| p.strip_prefix(dir).ok())
                .filter_map(|rest| rest.components().next())
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names.dedup();
            Ok(names
                .into_iter()
                .map(|name| DirEntryInfo {
                    name,
                    is_directory: true,
                })
                .collect())
        }

        async fn read_manifest(&self, path: &Path) -> Result<GhostManifest, GhostError> {
            let raw = self
                .manifests
                .get(path)
                .ok_or_else(|| GhostError::not_found(format!("{}", path.display())))?;
            Ok(serde_json::from_str(raw)?)
        }

        async fn read_module_source(
            &self,
            _plugin_dir: &Path,
            _module_name: &str,
        ) -> Result<Vec<u8>, GhostError> {
            Err(GhostError::not_found("no modules in map bridge"))
        }

        async fn fetch_icon(&self, _path: &str) -> Result<Vec<u8>, GhostError> {
            Ok(Vec::new())
        }

        async fn notify_native_switch(&self, _ghost_id: &str) -> Result<(), GhostError> {
            Ok(())
        }
    }

    fn manifest_json(id: &str) -> String {
        format!(
            r#"{{"id":"{id}","name":"{id}","version":"1.0.0","description":"d","author":"a","shortcut":"Alt+1","icon":"icon.png"}}"#
        )
    }

    #[tokio::test]
    async fn test_discover_finds_valid_plugins() {
        let bridge = MapBridge::default()
            .with_plugin("/plugins", "miku", &manifest_json("miku"))
            .with_plugin("/plugins", "rin", &manifest_json("rin"));
        let loader = ManifestLoader::new(Arc::new(bridge));

        let found = loader.discover().await;
        let mut ids: Vec<&str> = found.iter().map(|d| d.manifest.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["miku", "rin"]);
    }

    #[tokio::test]
    async fn test_malformed_manifest_skips_only_that_plugin() {
        let bridge = MapBridge::default()
            .with_plugin("/plugins", "a", &manifest_json("a"))
            .with_plugin("/plugins", "broken", r#"{"id": "broken""#)
            .with_plugin("/plugins", "c", &manifest_json("c"));
        let loader = ManifestLoader::new(Arc::new(bridge));

        let found = loader.discover().await;
        let mut ids: Vec<&str> = found.iter().map(|d| d.manifest.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_blank_id_fails_validation_and_is_skipped() {
        let bridge = MapBridge::default()
            .with_plugin("/plugins", "blank", &manifest_json(" "));
        let loader = ManifestLoader::new(Arc::new(bridge));
        assert!(loader.discover().await.is_empty());
    }

    #[tokio::test]
    async fn test_icon_is_resolved_against_plugin_dir() {
        let bridge = MapBridge::default().with_plugin("/plugins", "miku", &manifest_json("miku"));
        let loader = ManifestLoader::new(Arc::new(bridge));

        let found = loader.discover().await;
        assert_eq!(found[0].manifest.icon, "/plugins/miku/icon.png");
    }

    #[tokio::test]
    async fn test_empty_roots_yield_empty_scan() {
        let loader = ManifestLoader::new(Arc::new(MapBridge::default()));
        assert!(loader.discover().await.is_empty());
    }
}
