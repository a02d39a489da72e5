//! Abstract contracts between the runtime core and its collaborators.

pub mod host;
pub mod logger;

pub use host::{DirEntryInfo, HostBridge};
pub use logger::GhostLogger;
