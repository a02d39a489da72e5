//! Unified error types for the GhostHub runtime.
//!
//! All crates map their internal errors into [`GhostError`] for consistent
//! propagation through the ? operator. Switch rejection is deliberately not
//! an error: `switch_to` reports it through its outcome value.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A plugin root directory could not be scanned.
    Discovery,
    /// A plugin manifest was malformed or missing required fields.
    Manifest,
    /// A plugin module failed to compile or instantiate.
    ModuleLoad,
    /// A plugin lifecycle hook failed, trapped, or timed out.
    Hook,
    /// A host collaborator call failed.
    Host,
    /// The requested resource was not found.
    NotFound,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal runtime error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery => write!(f, "DISCOVERY"),
            Self::Manifest => write!(f, "MANIFEST"),
            Self::ModuleLoad => write!(f, "MODULE_LOAD"),
            Self::Hook => write!(f, "HOOK"),
            Self::Host => write!(f, "HOST"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error used throughout GhostHub.
///
/// Crate-specific failures are mapped into `GhostError` using `From` impls
/// or explicit `.map_err()` calls. Failures local to one plugin are logged
/// and contained by the lifecycle manager; they never cross plugin
/// boundaries.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct GhostError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GhostError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a discovery error.
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Discovery, message)
    }

    /// Create a manifest error.
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Manifest, message)
    }

    /// Create a module-load error.
    pub fn module_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModuleLoad, message)
    }

    /// Create a hook error.
    pub fn hook(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Hook, message)
    }

    /// Create a host collaborator error.
    pub fn host(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Host, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for GhostError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for GhostError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for GhostError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Host, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for GhostError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = GhostError::manifest("missing field 'id'");
        assert_eq!(err.to_string(), "MANIFEST: missing field 'id'");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("boom");
        let err = GhostError::with_source(ErrorKind::Host, "read failed", io);
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Host);
        assert!(cloned.source.is_none());
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GhostError = parse_err.into();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }
}
