//! Wasm-backed ghosts.
//!
//! A ghost module is instantiated once at load time and keeps its store
//! (and therefore its linear memory) for its whole registry lifetime, so
//! hooks see plugin state across calls. Each hook invocation gets a fresh
//! fuel budget; a runaway hook traps instead of wedging the switch latch.
//!
//! The linker exposes a single narrow host surface: `ghost.log`, routed to
//! the plugin's context logger. Modules have no ambient access to the
//! loader's state, the filesystem, or the network.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;
use wasmtime::{Caller, Engine, Instance, Linker, Memory, Module, Store};

use ghosthub_core::error::GhostError;

use crate::context::PluginContext;
use crate::ghost::{Capability, CapabilitySet, Ghost, ERROR_BUTTON_TEXT};

/// Exports every ghost module must provide.
const REQUIRED_EXPORTS: [&str; 6] = [
    "on_init",
    "on_cleanup",
    "on_activate",
    "on_deactivate",
    "on_click",
    "get_button_text",
];

/// Optional exports, probed once at instantiation.
const OPTIONAL_EXPORTS: [(Capability, &str); 6] = [
    (Capability::Init, "init"),
    (Capability::RightClick, "on_right_click"),
    (Capability::PushSc1, "on_push_sc1"),
    (Capability::PushSc2, "on_push_sc2"),
    (Capability::PushSc3, "on_push_sc3"),
    (Capability::PushSub, "on_push_sub"),
];

/// State stored in the wasmtime store for one ghost instance.
pub(crate) struct GhostState {
    /// The plugin's context; host functions reach the logger through it.
    context: Arc<PluginContext>,
}

struct WasmInstance {
    store: Store<GhostState>,
    instance: Instance,
}

/// A ghost whose capability set is implemented by a sandboxed wasm module.
pub struct WasmGhost {
    ghost_id: String,
    capabilities: CapabilitySet,
    hook_fuel: u64,
    inner: Mutex<WasmInstance>,
}

impl WasmGhost {
    /// Compiles and instantiates a module, probing its capability exports.
    ///
    /// Fails with a `ModuleLoad` error when the source does not compile,
    /// instantiation traps, or a required export is missing. The evaluator
    /// turns that failure into a stub; it never reaches the registry.
    pub(crate) fn instantiate(
        engine: &Engine,
        ghost_id: &str,
        source: &[u8],
        context: Arc<PluginContext>,
        hook_fuel: u64,
    ) -> Result<Self, GhostError> {
        // Diagnostic only; textual WAT and binary wasm both run.
        if source.starts_with(b"\0asm") {
            tracing::debug!(ghost_id = %ghost_id, "module source is binary wasm");
        } else {
            tracing::debug!(ghost_id = %ghost_id, "module source is textual");
        }

        let module = Module::new(engine, source).map_err(|e| {
            GhostError::module_load(format!("ghost '{ghost_id}' failed to compile: {e:#}"))
        })?;

        let mut linker = Linker::new(engine);
        define_host_functions(&mut linker).map_err(|e| {
            GhostError::internal(format!("failed to define host functions: {e:#}"))
        })?;

        let mut store = Store::new(engine, GhostState { context });
        store.set_fuel(hook_fuel).map_err(|e| {
            GhostError::internal(format!("failed to set fuel: {e:#}"))
        })?;

        let instance = linker.instantiate(&mut store, &module).map_err(|e| {
            GhostError::module_load(format!("ghost '{ghost_id}' failed to instantiate: {e:#}"))
        })?;

        for name in REQUIRED_EXPORTS {
            if instance.get_func(&mut store, name).is_none() {
                return Err(GhostError::module_load(format!(
                    "ghost '{ghost_id}' is missing required export '{name}'"
                )));
            }
        }

        let mut capabilities = CapabilitySet::new();
        for (capability, name) in OPTIONAL_EXPORTS {
            if instance.get_func(&mut store, name).is_some() {
                capabilities.insert(capability);
            }
        }

        Ok(Self {
            ghost_id: ghost_id.to_string(),
            capabilities,
            hook_fuel,
            inner: Mutex::new(WasmInstance { store, instance }),
        })
    }

    /// Invokes a `() -> ()` hook export with a fresh fuel budget.
    async fn call_hook(&self, name: &'static str) -> Result<(), GhostError> {
        let mut inner = self.inner.lock().await;
        let WasmInstance { store, instance } = &mut *inner;

        store.set_fuel(self.hook_fuel).map_err(|e| {
            GhostError::internal(format!("failed to reset fuel: {e:#}"))
        })?;

        let func = instance
            .get_typed_func::<(), ()>(&mut *store, name)
            .map_err(|e| {
                GhostError::hook(format!(
                    "ghost '{}' has no callable hook '{name}': {e:#}",
                    self.ghost_id
                ))
            })?;

        func.call(&mut *store, ()).map_err(|e| {
            GhostError::hook(format!(
                "ghost '{}' hook '{name}' trapped: {e:#}",
                self.ghost_id
            ))
        })
    }
}

#[async_trait]
impl Ghost for WasmGhost {
    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    // The context is already bound into the store; the export takes no
    // arguments and reaches it through host functions.
    async fn init(&self, _context: Arc<PluginContext>) -> Result<(), GhostError> {
        self.call_hook("init").await
    }

    async fn on_init(&self) -> Result<(), GhostError> {
        self.call_hook("on_init").await
    }

    async fn on_cleanup(&self) -> Result<(), GhostError> {
        self.call_hook("on_cleanup").await
    }

    async fn on_activate(&self) -> Result<(), GhostError> {
        self.call_hook("on_activate").await
    }

    async fn on_deactivate(&self) -> Result<(), GhostError> {
        self.call_hook("on_deactivate").await
    }

    async fn on_click(&self) -> Result<(), GhostError> {
        self.call_hook("on_click").await
    }

    async fn on_right_click(&self) -> Result<(), GhostError> {
        self.call_hook("on_right_click").await
    }

    async fn on_push_sc1(&self) -> Result<(), GhostError> {
        self.call_hook("on_push_sc1").await
    }

    async fn on_push_sc2(&self) -> Result<(), GhostError> {
        self.call_hook("on_push_sc2").await
    }

    async fn on_push_sc3(&self) -> Result<(), GhostError> {
        self.call_hook("on_push_sc3").await
    }

    async fn on_push_sub(&self) -> Result<(), GhostError> {
        self.call_hook("on_push_sub").await
    }

    async fn button_text(&self) -> String {
        let mut inner = self.inner.lock().await;
        let WasmInstance { store, instance } = &mut *inner;

        if let Err(e) = store.set_fuel(self.hook_fuel) {
            warn!(ghost_id = %self.ghost_id, error = %format!("{e:#}"), "failed to reset fuel");
            return ERROR_BUTTON_TEXT.to_string();
        }

        let func = match instance.get_typed_func::<(), (i32, i32)>(&mut *store, "get_button_text")
        {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    ghost_id = %self.ghost_id,
                    error = %format!("{e:#}"),
                    "get_button_text export unusable"
                );
                return ERROR_BUTTON_TEXT.to_string();
            }
        };

        let (ptr, len) = match func.call(&mut *store, ()) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(
                    ghost_id = %self.ghost_id,
                    error = %format!("{e:#}"),
                    "get_button_text trapped"
                );
                return ERROR_BUTTON_TEXT.to_string();
            }
        };

        let Some(memory) = instance.get_memory(&mut *store, "memory") else {
            warn!(ghost_id = %self.ghost_id, "module exports no memory");
            return ERROR_BUTTON_TEXT.to_string();
        };

        read_string_from_memory(&memory, &*store, ptr, len)
            .unwrap_or_else(|| ERROR_BUTTON_TEXT.to_string())
    }
}

impl std::fmt::Debug for WasmGhost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmGhost")
            .field("ghost_id", &self.ghost_id)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Defines the narrow host surface modules may import.
fn define_host_functions(linker: &mut Linker<GhostState>) -> Result<(), wasmtime::Error> {
    linker.func_wrap(
        "ghost",
        "log",
        |mut caller: Caller<'_, GhostState>, level: i32, ptr: i32, len: i32| {
            let memory = match caller.get_export("memory") {
                Some(wasmtime::Extern::Memory(mem)) => mem,
                _ => return,
            };
            let Some(message) = read_string_from_memory(&memory, &caller, ptr, len) else {
                return;
            };
            let logger = caller.data().context.logger.clone();
            match level {
                0 => logger.debug(&message),
                1 => logger.info(&message),
                2 => logger.warn(&message),
                _ => logger.error(&message),
            }
        },
    )?;
    Ok(())
}

/// Reads a UTF-8 string out of a module's linear memory.
fn read_string_from_memory(
    memory: &Memory,
    store: impl wasmtime::AsContext<Data = GhostState>,
    ptr: i32,
    len: i32,
) -> Option<String> {
    let ptr = usize::try_from(ptr).ok()?;
    let len = usize::try_from(len).ok()?;
    let data = memory.data(&store);
    if ptr.checked_add(len)? > data.len() {
        return None;
    }
    String::from_utf8(data[ptr..ptr + len].to_vec()).ok()
}
