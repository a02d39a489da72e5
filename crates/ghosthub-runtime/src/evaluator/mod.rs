//! Module evaluator — turns plugin module source into a capability set.
//!
//! Plugin code is untrusted third-party material: the runtime must stay
//! available even when one plugin's module is broken or incompatible.
//! Evaluation therefore never fails outward — a module that cannot be
//! compiled or instantiated degrades to a [`stub::StubGhost`] whose every
//! hook logs and no-ops.

pub mod stub;
pub mod wasm;

use std::sync::Arc;

use tracing::{info, warn};
use wasmtime::{Config, Engine};

use ghosthub_core::error::GhostError;

use crate::context::PluginContext;
use crate::ghost::Ghost;

use self::stub::StubGhost;
use self::wasm::WasmGhost;

/// Evaluates plugin module source into ghost capability sets.
///
/// The engine (and its fuel configuration) is shared across all plugins;
/// each ghost gets its own store and instance.
pub struct ModuleEvaluator {
    engine: Engine,
    hook_fuel: u64,
}

impl ModuleEvaluator {
    /// Creates an evaluator with the given per-hook fuel budget.
    pub fn new(hook_fuel: u64) -> Result<Self, GhostError> {
        let mut config = Config::new();
        config.consume_fuel(true);
        let engine = Engine::new(&config).map_err(|e| {
            GhostError::internal(format!("failed to create wasm engine: {e:#}"))
        })?;
        Ok(Self { engine, hook_fuel })
    }

    /// Evaluates module source for one ghost id.
    ///
    /// Always returns a usable capability set: the real module on success,
    /// the safe stub on any load-time failure.
    pub fn evaluate(
        &self,
        ghost_id: &str,
        source: &[u8],
        context: Arc<PluginContext>,
    ) -> Arc<dyn Ghost> {
        match WasmGhost::instantiate(&self.engine, ghost_id, source, context, self.hook_fuel) {
            Ok(ghost) => {
                info!(
                    ghost_id = %ghost_id,
                    capabilities = ghost.capabilities().len(),
                    "ghost module evaluated"
                );
                Arc::new(ghost)
            }
            Err(e) => {
                warn!(
                    ghost_id = %ghost_id,
                    error = %e,
                    "module evaluation failed, installing stub capability set"
                );
                Arc::new(StubGhost::new(ghost_id))
            }
        }
    }
}

impl std::fmt::Debug for ModuleEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEvaluator")
            .field("hook_fuel", &self.hook_fuel)
            .finish()
    }
}
