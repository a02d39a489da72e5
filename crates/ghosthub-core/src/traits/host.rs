//! Host-application bridge contract.
//!
//! The core never reaches for ambient global state: every host capability
//! (directory listings, file bytes, native event delivery) is injected as an
//! implementation of [`HostBridge`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::GhostError;
use crate::manifest::GhostManifest;

/// A single entry of a plugin root directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// Entry name relative to the listed directory.
    pub name: String,
    /// Whether the entry is itself a directory.
    pub is_directory: bool,
}

/// Host collaborator supplying directory listings, file bytes, and native
/// event delivery to the plugin runtime.
#[async_trait]
pub trait HostBridge: Send + Sync + std::fmt::Debug {
    /// Returns the plugin root directories to scan.
    async fn plugin_roots(&self) -> Result<Vec<PathBuf>, GhostError>;

    /// Lists the entries of one plugin root directory.
    async fn list_entries(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, GhostError>;

    /// Reads and parses a plugin manifest file.
    async fn read_manifest(&self, path: &Path) -> Result<GhostManifest, GhostError>;

    /// Reads the plugin module source bytes for the named module.
    async fn read_module_source(
        &self,
        plugin_dir: &Path,
        module_name: &str,
    ) -> Result<Vec<u8>, GhostError>;

    /// Fetches icon bytes for a resolved icon path.
    ///
    /// An empty result signals "use the default icon".
    async fn fetch_icon(&self, path: &str) -> Result<Vec<u8>, GhostError>;

    /// Best-effort notification of a completed switch to the native side.
    async fn notify_native_switch(&self, ghost_id: &str) -> Result<(), GhostError>;
}
