//! The loaded-ghost registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::context::PluginContext;
use crate::ghost::LoadedGhost;

/// Concurrent store of loaded ghosts and their contexts, keyed by ghost id.
///
/// Loading the same id twice replaces the previous entry; the manager is
/// responsible for cleaning up the replaced ghost first.
#[derive(Debug, Default)]
pub struct GhostRegistry {
    ghosts: RwLock<HashMap<String, LoadedGhost>>,
    contexts: RwLock<HashMap<String, Arc<PluginContext>>>,
}

impl GhostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) a ghost and its context.
    ///
    /// Returns the previous entry for the id, if any.
    pub async fn insert(
        &self,
        loaded: LoadedGhost,
        context: Arc<PluginContext>,
    ) -> Option<LoadedGhost> {
        let id = loaded.manifest.id.clone();
        self.contexts.write().await.insert(id.clone(), context);
        self.ghosts.write().await.insert(id, loaded)
    }

    /// Looks up a ghost by id.
    pub async fn get(&self, id: &str) -> Option<LoadedGhost> {
        self.ghosts.read().await.get(id).cloned()
    }

    /// Whether a ghost with this id is loaded.
    pub async fn contains(&self, id: &str) -> bool {
        self.ghosts.read().await.contains_key(id)
    }

    /// Looks up a ghost's context by id.
    pub async fn context(&self, id: &str) -> Option<Arc<PluginContext>> {
        self.contexts.read().await.get(id).cloned()
    }

    /// Snapshot of all loaded ghosts, sorted by id for stable iteration.
    pub async fn list(&self) -> Vec<LoadedGhost> {
        let ghosts = self.ghosts.read().await;
        let mut all: Vec<LoadedGhost> = ghosts.values().cloned().collect();
        all.sort_by(|a, b| a.manifest.id.cmp(&b.manifest.id));
        all
    }

    /// Number of loaded ghosts.
    pub async fn count(&self) -> usize {
        self.ghosts.read().await.len()
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.ghosts.write().await.clear();
        self.contexts.write().await.clear();
    }
}
