//! # ghosthub-core
//!
//! Shared foundation for the GhostHub plugin runtime:
//!
//! - Unified error type ([`error::GhostError`])
//! - Configuration schemas ([`config`])
//! - Lifecycle event records ([`events`])
//! - The ghost manifest type ([`manifest::GhostManifest`])
//! - Host collaborator contracts ([`traits`])

pub mod config;
pub mod error;
pub mod events;
pub mod manifest;
pub mod traits;

pub use config::HostConfig;
pub use error::{ErrorKind, GhostError};
pub use events::{GhostEvent, GhostEventKind};
pub use manifest::GhostManifest;
pub use traits::host::{DirEntryInfo, HostBridge};
pub use traits::logger::GhostLogger;
