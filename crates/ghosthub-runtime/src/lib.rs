//! # ghosthub-runtime
//!
//! The GhostHub plugin runtime and lifecycle manager. Provides:
//!
//! - Manifest discovery over an injected host bridge
//! - Sandboxed module evaluation (wasm) with safe stub degradation
//! - Per-plugin contexts with a structured logger
//! - An in-process, in-order event bus
//! - The registry and the concurrency-safe switch protocol: at most one
//!   ghost active, at most one switch in flight, one queued successor

pub mod bus;
pub mod context;
pub mod evaluator;
pub mod ghost;
pub mod loader;
pub mod manager;
pub mod registry;

pub use bus::{EventBus, SubscriptionId};
pub use context::{ContextFactory, PluginContext};
pub use evaluator::ModuleEvaluator;
pub use ghost::{Capability, CapabilitySet, Ghost, LoadedGhost, ERROR_BUTTON_TEXT};
pub use loader::ManifestLoader;
pub use manager::{GhostManager, SwitchOutcome};
pub use registry::GhostRegistry;
