//! Safe stub capability set installed when a module fails to evaluate.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use ghosthub_core::error::GhostError;

use crate::context::PluginContext;
use crate::ghost::{CapabilitySet, Ghost, ERROR_BUTTON_TEXT};

/// Inert ghost standing in for a module that failed to load.
///
/// Every hook logs an error and completes as a no-op, so the registry never
/// holds a partially constructed or throwing capability set. The plugin
/// stays selectable but functionally dead, and says so on every call.
#[derive(Debug)]
pub struct StubGhost {
    ghost_id: String,
    capabilities: CapabilitySet,
}

impl StubGhost {
    /// Creates a stub for the given ghost id.
    pub fn new(ghost_id: &str) -> Self {
        Self {
            ghost_id: ghost_id.to_string(),
            // Declare everything so every dispatch reaches the stub and logs.
            capabilities: CapabilitySet::all(),
        }
    }

    fn report(&self, hook: &str) {
        error!(
            ghost_id = %self.ghost_id,
            hook = hook,
            "module failed to load; stub hook invoked"
        );
    }
}

#[async_trait]
impl Ghost for StubGhost {
    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn init(&self, _context: Arc<PluginContext>) -> Result<(), GhostError> {
        self.report("init");
        Ok(())
    }

    async fn on_init(&self) -> Result<(), GhostError> {
        self.report("on_init");
        Ok(())
    }

    async fn on_cleanup(&self) -> Result<(), GhostError> {
        self.report("on_cleanup");
        Ok(())
    }

    async fn on_activate(&self) -> Result<(), GhostError> {
        self.report("on_activate");
        Ok(())
    }

    async fn on_deactivate(&self) -> Result<(), GhostError> {
        self.report("on_deactivate");
        Ok(())
    }

    async fn on_click(&self) -> Result<(), GhostError> {
        self.report("on_click");
        Ok(())
    }

    async fn on_right_click(&self) -> Result<(), GhostError> {
        self.report("on_right_click");
        Ok(())
    }

    async fn on_push_sc1(&self) -> Result<(), GhostError> {
        self.report("on_push_sc1");
        Ok(())
    }

    async fn on_push_sc2(&self) -> Result<(), GhostError> {
        self.report("on_push_sc2");
        Ok(())
    }

    async fn on_push_sc3(&self) -> Result<(), GhostError> {
        self.report("on_push_sc3");
        Ok(())
    }

    async fn on_push_sub(&self) -> Result<(), GhostError> {
        self.report("on_push_sub");
        Ok(())
    }

    async fn button_text(&self) -> String {
        self.report("get_button_text");
        ERROR_BUTTON_TEXT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_hooks_are_harmless() {
        let stub = StubGhost::new("broken");
        stub.on_init().await.expect("no-op");
        stub.on_activate().await.expect("no-op");
        stub.on_click().await.expect("no-op");
        stub.on_cleanup().await.expect("no-op");
    }

    #[tokio::test]
    async fn test_stub_button_text_is_error_marker() {
        let stub = StubGhost::new("broken");
        assert_eq!(stub.button_text().await, ERROR_BUTTON_TEXT);
    }

    #[test]
    fn test_stub_declares_all_capabilities() {
        let stub = StubGhost::new("broken");
        assert_eq!(*stub.capabilities(), CapabilitySet::all());
    }
}
