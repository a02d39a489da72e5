//! Per-plugin context bundles and their factory.

use std::sync::Arc;

use ghosthub_core::traits::host::HostBridge;
use ghosthub_core::traits::logger::GhostLogger;

/// Capability bundle handed to a plugin at init.
///
/// One instance per loaded ghost, created at load time and never mutated
/// afterwards; re-loading the same id replaces its context.
#[derive(Debug, Clone)]
pub struct PluginContext {
    /// The owning plugin's id.
    pub ghost_id: String,
    /// Plugin-scoped logger.
    pub logger: Arc<dyn GhostLogger>,
    /// Host bindings, when the host bridge is shared with plugins.
    pub host: Option<Arc<dyn HostBridge>>,
}

/// Builds per-plugin contexts.
///
/// Context creation is side-effect-light and never blocks on plugin code.
#[derive(Debug, Clone)]
pub struct ContextFactory {
    /// Host bridge to expose to plugins, if any.
    host: Option<Arc<dyn HostBridge>>,
}

impl ContextFactory {
    /// Creates a factory. Pass `None` to withhold host bindings from plugins.
    pub fn new(host: Option<Arc<dyn HostBridge>>) -> Self {
        Self { host }
    }

    /// Creates the context for one ghost id.
    pub fn create(&self, ghost_id: &str) -> Arc<PluginContext> {
        Arc::new(PluginContext {
            ghost_id: ghost_id.to_string(),
            logger: Arc::new(TracingGhostLogger::new(ghost_id)),
            host: self.host.clone(),
        })
    }
}

/// Logger that tags every record with the owning ghost id and routes it
/// through the host's `tracing` subscriber.
#[derive(Debug)]
pub struct TracingGhostLogger {
    ghost_id: String,
}

impl TracingGhostLogger {
    /// Creates a logger scoped to one ghost id.
    pub fn new(ghost_id: &str) -> Self {
        Self {
            ghost_id: ghost_id.to_string(),
        }
    }
}

impl GhostLogger for TracingGhostLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(ghost_id = %self.ghost_id, "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(ghost_id = %self.ghost_id, "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(ghost_id = %self.ghost_id, "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(ghost_id = %self.ghost_id, "{message}");
    }
}
