//! Filesystem host bridge backed by `tokio::fs`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use ghosthub_core::error::GhostError;
use ghosthub_core::manifest::GhostManifest;
use ghosthub_core::traits::host::{DirEntryInfo, HostBridge};

/// Host bridge that serves plugin directories straight from the local
/// filesystem.
///
/// Module source resolution tries `<module_name>.wat` first, then
/// `<module_name>.wasm`.
#[derive(Debug, Clone)]
pub struct FsHostBridge {
    /// Plugin root directories to scan.
    roots: Vec<PathBuf>,
}

impl FsHostBridge {
    /// Creates a bridge over the given plugin root directories.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

#[async_trait]
impl HostBridge for FsHostBridge {
    async fn plugin_roots(&self) -> Result<Vec<PathBuf>, GhostError> {
        Ok(self.roots.clone())
    }

    async fn list_entries(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, GhostError> {
        let mut read_dir = tokio::fs::read_dir(dir).await.map_err(|e| {
            GhostError::discovery(format!("Cannot read plugin root '{}': {e}", dir.display()))
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| {
            GhostError::discovery(format!("Cannot read entry in '{}': {e}", dir.display()))
        })? {
            let file_type = entry.file_type().await.map_err(|e| {
                GhostError::discovery(format!(
                    "Cannot stat '{}': {e}",
                    entry.path().display()
                ))
            })?;
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory: file_type.is_dir(),
            });
        }

        // Stable scan order regardless of filesystem iteration order.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_manifest(&self, path: &Path) -> Result<GhostManifest, GhostError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            GhostError::manifest(format!("Cannot read manifest '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            GhostError::manifest(format!("Malformed manifest '{}': {e}", path.display()))
        })
    }

    async fn read_module_source(
        &self,
        plugin_dir: &Path,
        module_name: &str,
    ) -> Result<Vec<u8>, GhostError> {
        for extension in ["wat", "wasm"] {
            let candidate = plugin_dir.join(format!("{module_name}.{extension}"));
            match tokio::fs::read(&candidate).await {
                Ok(bytes) => {
                    debug!(path = %candidate.display(), "plugin module source found");
                    return Ok(bytes);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(GhostError::host(format!(
                        "Cannot read module '{}': {e}",
                        candidate.display()
                    )));
                }
            }
        }
        Err(GhostError::not_found(format!(
            "No module '{module_name}' (.wat/.wasm) in '{}'",
            plugin_dir.display()
        )))
    }

    async fn fetch_icon(&self, path: &str) -> Result<Vec<u8>, GhostError> {
        // Remote and embedded icons are the presentation layer's problem.
        if path.starts_with("http") || path.starts_with("data:") {
            return Ok(Vec::new());
        }
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            // Missing icon means "use the default icon", not a failure.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(GhostError::host(format!("Cannot read icon '{path}': {e}"))),
        }
    }

    async fn notify_native_switch(&self, ghost_id: &str) -> Result<(), GhostError> {
        // The headless host has no native side to inform.
        debug!(ghost_id = %ghost_id, "native switch notification (no-op)");
        Ok(())
    }
}
