//! Ghost lifecycle management and the switch protocol.
//!
//! Invariants enforced here:
//!
//! - At most one ghost is active at a time.
//! - At most one switch is in flight; the latch holder performs every
//!   transition serially.
//! - Requests arriving mid-switch land in a single pending slot, last
//!   writer wins; intermediate targets are never activated.
//! - Hook failures are logged and never abort a transition: the registry
//!   and the active pointer always reflect the completed switch.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info, warn};

use ghosthub_core::config::{PluginsConfig, SwitchingConfig};
use ghosthub_core::error::GhostError;
use ghosthub_core::events::{GhostEvent, GhostEventKind};
use ghosthub_core::traits::host::HostBridge;

use crate::bus::EventBus;
use crate::context::ContextFactory;
use crate::evaluator::ModuleEvaluator;
use crate::ghost::{Capability, LoadedGhost};
use crate::loader::{DiscoveredGhost, ManifestLoader};
use crate::registry::GhostRegistry;

/// How a switch request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The transition ran (and any queued successors were drained).
    Switched,
    /// The target was already active and no switch was in flight.
    AlreadyCurrent,
    /// A switch was in flight; the request took the pending slot.
    Queued,
    /// No loaded ghost has this id.
    UnknownGhost,
}

#[derive(Debug, Default)]
struct SwitchState {
    /// Id of the active ghost, if any.
    current_id: Option<String>,
    /// The switch latch.
    is_switching: bool,
    /// Single-slot successor queue; overwritten by later requests.
    pending_switch_id: Option<String>,
    /// When the last transition completed.
    last_switch_at: Option<tokio::time::Instant>,
}

/// Owns plugin loading, the active-ghost pointer, and hook dispatch.
#[derive(Debug)]
pub struct GhostManager {
    registry: Arc<GhostRegistry>,
    bus: Arc<EventBus>,
    evaluator: ModuleEvaluator,
    contexts: ContextFactory,
    loader: ManifestLoader,
    bridge: Arc<dyn HostBridge>,
    state: Mutex<SwitchState>,
    /// Signaled each time the switch latch is released.
    latch_released: Notify,
    load_in_progress: AtomicBool,
    settle_delay: Duration,
    hook_timeout: Option<Duration>,
    module_name: String,
}

impl GhostManager {
    pub fn new(
        bridge: Arc<dyn HostBridge>,
        plugins: &PluginsConfig,
        switching: &SwitchingConfig,
    ) -> Result<Self, GhostError> {
        let evaluator = ModuleEvaluator::new(switching.hook_fuel)?;
        let hook_timeout = (switching.hook_timeout_secs > 0)
            .then(|| Duration::from_secs(switching.hook_timeout_secs));
        Ok(Self {
            registry: Arc::new(GhostRegistry::new()),
            bus: Arc::new(EventBus::new()),
            evaluator,
            contexts: ContextFactory::new(Some(bridge.clone())),
            loader: ManifestLoader::new(bridge.clone()),
            bridge,
            state: Mutex::new(SwitchState::default()),
            latch_released: Notify::new(),
            load_in_progress: AtomicBool::new(false),
            settle_delay: Duration::from_millis(switching.settle_delay_ms),
            hook_timeout,
            module_name: plugins.module_name.clone(),
        })
    }

    /// The lifecycle event bus.
    pub fn bus(&self) -> Arc<EventBus> {
        self.bus.clone()
    }

    /// The loaded-ghost registry.
    pub fn registry(&self) -> &GhostRegistry {
        &self.registry
    }

    /// Id of the active ghost, if any.
    pub async fn current_id(&self) -> Option<String> {
        self.state.lock().await.current_id.clone()
    }

    /// When the last switch completed, if one has.
    pub async fn last_switch_at(&self) -> Option<tokio::time::Instant> {
        self.state.lock().await.last_switch_at
    }

    /// The active ghost, if any.
    pub async fn current_ghost(&self) -> Option<LoadedGhost> {
        let id = self.current_id().await?;
        self.registry.get(&id).await
    }

    /// Snapshot of all loaded ghosts, sorted by id.
    pub async fn ghosts(&self) -> Vec<LoadedGhost> {
        self.registry.list().await
    }

    /// A loaded ghost's context, if the id is registered.
    pub async fn context(&self, ghost_id: &str) -> Option<Arc<crate::context::PluginContext>> {
        self.registry.context(ghost_id).await
    }

    /// Discovers and loads every valid plugin. Returns the number loaded.
    ///
    /// Re-entrant calls while a load is in progress are rejected with a
    /// warning and load nothing.
    pub async fn load_all(&self) -> usize {
        if self
            .load_in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("plugin load already in progress, ignoring request");
            return 0;
        }

        let discovered = self.loader.discover().await;
        let mut loaded = 0;
        for entry in &discovered {
            match self.load_single(entry).await {
                Ok(()) => loaded += 1,
                Err(e) => {
                    warn!(ghost_id = %entry.manifest.id, error = %e, "failed to load ghost");
                }
            }
        }

        self.load_in_progress.store(false, Ordering::SeqCst);
        info!(loaded, discovered = discovered.len(), "plugin load complete");
        loaded
    }

    /// Loads one discovered plugin: module evaluation, init hooks, registry
    /// insertion. The entry is inserted only after both init hooks succeed.
    /// A ghost already registered under the same id is cleaned up before it
    /// is replaced.
    async fn load_single(&self, discovered: &DiscoveredGhost) -> Result<(), GhostError> {
        let id = discovered.manifest.id.as_str();
        let source = self
            .bridge
            .read_module_source(&discovered.dir, &self.module_name)
            .await?;

        let context = self.contexts.create(id);
        let ghost = self.evaluator.evaluate(id, &source, context.clone());

        if ghost.capabilities().contains(Capability::Init) {
            self.bounded("init", ghost.init(context.clone())).await?;
        }
        self.bounded("on_init", ghost.on_init()).await?;

        if let Some(previous) = self.registry.get(id).await {
            warn!(ghost_id = %id, "id collision, cleaning up previous ghost");
            if let Err(e) = self.bounded("on_cleanup", previous.ghost.on_cleanup()).await {
                error!(ghost_id = %id, error = %e, "on_cleanup hook failed for replaced ghost");
            }
        }
        self.registry
            .insert(
                LoadedGhost {
                    manifest: discovered.manifest.clone(),
                    ghost,
                },
                context,
            )
            .await;
        Ok(())
    }

    /// Requests a switch of the active ghost.
    ///
    /// When no switch is in flight this performs the transition inline and
    /// then drains the pending slot until it is empty. When a switch is in
    /// flight the request lands in the pending slot (overwriting any earlier
    /// occupant) and returns immediately.
    pub async fn switch_to(&self, ghost_id: &str) -> SwitchOutcome {
        if !self.registry.contains(ghost_id).await {
            warn!(ghost_id = %ghost_id, "switch requested for unknown ghost");
            return SwitchOutcome::UnknownGhost;
        }

        {
            let mut state = self.state.lock().await;
            if state.is_switching {
                debug!(ghost_id = %ghost_id, "switch in flight, queueing");
                state.pending_switch_id = Some(ghost_id.to_string());
                return SwitchOutcome::Queued;
            }
            if state.current_id.as_deref() == Some(ghost_id) {
                debug!(ghost_id = %ghost_id, "already current, ignoring switch");
                return SwitchOutcome::AlreadyCurrent;
            }
            state.is_switching = true;
        }

        self.run_switch_loop(ghost_id.to_string()).await;
        SwitchOutcome::Switched
    }

    /// Performs transitions while holding the switch latch, draining the
    /// pending slot between them, and releases the latch when the slot is
    /// empty. Requests queued during the drain are picked up too.
    async fn run_switch_loop(&self, mut target: String) {
        loop {
            self.perform_transition(&target).await;

            // Latch still held; pick the next target or release.
            let next = loop {
                let pending = {
                    let mut state = self.state.lock().await;
                    state.current_id = Some(target.clone());
                    state.last_switch_at = Some(tokio::time::Instant::now());
                    match state.pending_switch_id.take() {
                        Some(pending) => Some(pending),
                        None => {
                            state.is_switching = false;
                            None
                        }
                    }
                };
                let Some(pending) = pending else {
                    self.latch_released.notify_one();
                    return;
                };
                if pending == target {
                    debug!(ghost_id = %pending, "queued target already current, dropping");
                    continue;
                }
                if !self.registry.contains(&pending).await {
                    warn!(ghost_id = %pending, "queued target no longer loaded, dropping");
                    continue;
                }
                break pending;
            };

            if !self.settle_delay.is_zero() {
                tokio::time::sleep(self.settle_delay).await;
            }
            target = next;
        }
    }

    /// One deactivate/activate transition. Hook errors are logged and the
    /// transition completes regardless; events fire either way so listeners
    /// stay in sync with the active pointer.
    async fn perform_transition(&self, target: &str) {
        let old_id = { self.state.lock().await.current_id.clone() };
        if let Some(old_id) = old_id {
            if let Some(old) = self.registry.get(&old_id).await {
                if let Err(e) = self.bounded("on_deactivate", old.ghost.on_deactivate()).await {
                    error!(ghost_id = %old_id, error = %e, "on_deactivate hook failed");
                }
            }
            self.bus
                .publish(&GhostEvent::new(GhostEventKind::Deactivate, old_id));
        }

        if let Some(new) = self.registry.get(target).await {
            if let Err(e) = self.bounded("on_activate", new.ghost.on_activate()).await {
                error!(ghost_id = %target, error = %e, "on_activate hook failed");
            }
        }
        self.bus
            .publish(&GhostEvent::new(GhostEventKind::Activate, target));

        if let Err(e) = self.bridge.notify_native_switch(target).await {
            warn!(ghost_id = %target, error = %e, "native switch notification failed");
        }
        info!(ghost_id = %target, "ghost switched");
    }

    /// Dispatches a click to the active ghost.
    pub async fn handle_click(&self) {
        let Some(id) = self.current_id().await else {
            debug!("click with no active ghost, ignoring");
            return;
        };
        if let Some(loaded) = self.registry.get(&id).await {
            match self.bounded("on_click", loaded.ghost.on_click()).await {
                Ok(()) => self.bus.publish(&GhostEvent::new(GhostEventKind::Click, id)),
                Err(e) => error!(ghost_id = %id, error = %e, "on_click hook failed"),
            }
        }
    }

    /// Dispatches a right-click to the active ghost, if it handles one.
    pub async fn handle_right_click(&self) {
        self.dispatch_optional(Capability::RightClick, GhostEventKind::RightClick)
            .await;
    }

    /// Dispatches global shortcut 1 to the active ghost, if handled.
    pub async fn handle_push_sc1(&self) {
        self.dispatch_optional(Capability::PushSc1, GhostEventKind::PushSc1)
            .await;
    }

    /// Dispatches global shortcut 2 to the active ghost, if handled.
    pub async fn handle_push_sc2(&self) {
        self.dispatch_optional(Capability::PushSc2, GhostEventKind::PushSc2)
            .await;
    }

    /// Dispatches global shortcut 3 to the active ghost, if handled.
    pub async fn handle_push_sc3(&self) {
        self.dispatch_optional(Capability::PushSc3, GhostEventKind::PushSc3)
            .await;
    }

    /// Dispatches the sub shortcut to the active ghost, if handled.
    pub async fn handle_push_sub(&self) {
        self.dispatch_optional(Capability::PushSub, GhostEventKind::PushSub)
            .await;
    }

    /// Returns the active ghost's button label, or `None` when no ghost is
    /// active.
    pub async fn button_text(&self) -> Option<String> {
        let loaded = self.current_ghost().await?;
        Some(loaded.ghost.button_text().await)
    }

    /// Dispatches an optional hook to the active ghost. Absence of the
    /// capability is a silent no-op; no event fires for it.
    async fn dispatch_optional(&self, capability: Capability, kind: GhostEventKind) {
        let Some(id) = self.current_id().await else {
            debug!(hook = capability.as_str(), "no active ghost, ignoring");
            return;
        };
        let Some(loaded) = self.registry.get(&id).await else {
            return;
        };
        if !loaded.ghost.capabilities().contains(capability) {
            debug!(ghost_id = %id, hook = capability.as_str(), "capability not exposed, ignoring");
            return;
        }

        let hook = capability.as_str();
        let result = match capability {
            Capability::RightClick => self.bounded(hook, loaded.ghost.on_right_click()).await,
            Capability::PushSc1 => self.bounded(hook, loaded.ghost.on_push_sc1()).await,
            Capability::PushSc2 => self.bounded(hook, loaded.ghost.on_push_sc2()).await,
            Capability::PushSc3 => self.bounded(hook, loaded.ghost.on_push_sc3()).await,
            Capability::PushSub => self.bounded(hook, loaded.ghost.on_push_sub()).await,
            // Init runs only from the load path.
            Capability::Init => return,
        };
        match result {
            Ok(()) => self.bus.publish(&GhostEvent::new(kind, id)),
            Err(e) => error!(ghost_id = %id, hook, error = %e, "hook failed"),
        }
    }

    /// Deactivates the active ghost, runs every ghost's cleanup, and empties
    /// the registry and the bus.
    ///
    /// Waits out any in-flight switch first, so the latch holder cannot
    /// re-install `current_id` after the registry is cleared.
    pub async fn teardown(&self) {
        let current = loop {
            {
                let mut state = self.state.lock().await;
                state.pending_switch_id = None;
                if !state.is_switching {
                    break state.current_id.take();
                }
            }
            self.latch_released.notified().await;
        };
        if let Some(id) = current {
            if let Some(loaded) = self.registry.get(&id).await {
                if let Err(e) = self
                    .bounded("on_deactivate", loaded.ghost.on_deactivate())
                    .await
                {
                    error!(ghost_id = %id, error = %e, "on_deactivate hook failed");
                }
            }
            self.bus
                .publish(&GhostEvent::new(GhostEventKind::Deactivate, id));
        }

        for loaded in self.registry.list().await {
            if let Err(e) = self.bounded("on_cleanup", loaded.ghost.on_cleanup()).await {
                error!(
                    ghost_id = %loaded.manifest.id,
                    error = %e,
                    "on_cleanup hook failed"
                );
            }
        }
        self.registry.clear().await;
        self.bus.clear();
        info!("ghost runtime torn down");
    }

    /// Runs one hook future under the configured timeout, if any.
    async fn bounded<F>(&self, hook: &'static str, fut: F) -> Result<(), GhostError>
    where
        F: Future<Output = Result<(), GhostError>>,
    {
        match self.hook_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(GhostError::hook(format!(
                    "hook '{hook}' timed out after {}s",
                    limit.as_secs()
                ))),
            },
            None => fut.await,
        }
    }
}
