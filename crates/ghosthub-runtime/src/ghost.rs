//! The ghost capability contract and the registry entry type.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use ghosthub_core::error::GhostError;
use ghosthub_core::manifest::GhostManifest;

use crate::context::PluginContext;

/// Fixed marker returned by `button_text` when a module failed to load or
/// the call itself failed.
pub const ERROR_BUTTON_TEXT: &str = "ERROR";

/// Optional capabilities a ghost module may expose.
///
/// Absence of an optional capability is a legal no-op, not an error. The
/// manager checks presence before dispatching instead of calling blindly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Context-accepting initializer, called before `on_init`.
    Init,
    /// Right-click handler.
    RightClick,
    /// Global shortcut 1 handler.
    PushSc1,
    /// Global shortcut 2 handler.
    PushSc2,
    /// Global shortcut 3 handler.
    PushSc3,
    /// Sub shortcut handler.
    PushSub,
}

impl Capability {
    /// All optional capabilities.
    pub const ALL: [Capability; 6] = [
        Capability::Init,
        Capability::RightClick,
        Capability::PushSc1,
        Capability::PushSc2,
        Capability::PushSc3,
        Capability::PushSub,
    ];

    /// Returns the hook name for this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::RightClick => "on_right_click",
            Self::PushSc1 => "on_push_sc1",
            Self::PushSc2 => "on_push_sc2",
            Self::PushSc3 => "on_push_sc3",
            Self::PushSub => "on_push_sub",
        }
    }
}

/// The set of optional capabilities a loaded ghost exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(HashSet<Capability>);

impl CapabilitySet {
    /// Creates an empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set containing every optional capability.
    pub fn all() -> Self {
        Self(Capability::ALL.into_iter().collect())
    }

    /// Adds a capability.
    pub fn insert(&mut self, capability: Capability) {
        self.0.insert(capability);
    }

    /// Returns whether the capability is present.
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Number of capabilities present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no optional capability is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The lifecycle/input capability set a ghost module implements.
///
/// Required hooks must exist on every ghost; optional hooks are gated by
/// [`Ghost::capabilities`] and default to no-ops here so implementations
/// only override what they expose.
#[async_trait]
pub trait Ghost: Send + Sync + std::fmt::Debug {
    /// The optional capabilities this ghost exposes.
    fn capabilities(&self) -> &CapabilitySet;

    /// Optional context-accepting initializer (gated by [`Capability::Init`]).
    async fn init(&self, context: Arc<PluginContext>) -> Result<(), GhostError> {
        let _ = context;
        Ok(())
    }

    /// Called once after a successful load.
    async fn on_init(&self) -> Result<(), GhostError>;

    /// Called when the ghost is replaced or the runtime tears down.
    async fn on_cleanup(&self) -> Result<(), GhostError>;

    /// Called when the ghost becomes active.
    async fn on_activate(&self) -> Result<(), GhostError>;

    /// Called when the ghost loses active status.
    async fn on_deactivate(&self) -> Result<(), GhostError>;

    /// Called when the active ghost is clicked.
    async fn on_click(&self) -> Result<(), GhostError>;

    /// Right-click handler (gated by [`Capability::RightClick`]).
    async fn on_right_click(&self) -> Result<(), GhostError> {
        Ok(())
    }

    /// Shortcut 1 handler (gated by [`Capability::PushSc1`]).
    async fn on_push_sc1(&self) -> Result<(), GhostError> {
        Ok(())
    }

    /// Shortcut 2 handler (gated by [`Capability::PushSc2`]).
    async fn on_push_sc2(&self) -> Result<(), GhostError> {
        Ok(())
    }

    /// Shortcut 3 handler (gated by [`Capability::PushSc3`]).
    async fn on_push_sc3(&self) -> Result<(), GhostError> {
        Ok(())
    }

    /// Sub shortcut handler (gated by [`Capability::PushSub`]).
    async fn on_push_sub(&self) -> Result<(), GhostError> {
        Ok(())
    }

    /// Returns the ghost's current button label.
    async fn button_text(&self) -> String;
}

/// A fully loaded plugin: manifest plus capability set, owned by the
/// registry and keyed by the manifest id.
#[derive(Debug, Clone)]
pub struct LoadedGhost {
    /// The plugin's manifest.
    pub manifest: GhostManifest,
    /// The plugin's capability set implementation.
    pub ghost: Arc<dyn Ghost>,
}
