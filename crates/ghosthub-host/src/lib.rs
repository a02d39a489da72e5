//! # ghosthub-host
//!
//! Filesystem-backed implementation of the [`ghosthub_core::HostBridge`]
//! collaborator contract, used by the headless `ghost-host` binary.

pub mod fs;

pub use fs::FsHostBridge;
