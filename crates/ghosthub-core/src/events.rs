//! Lifecycle events emitted by the ghost runtime.
//!
//! Events are dispatched through the in-process event bus and consumed by
//! presentation components (icon/text refresh) and diagnostic tooling.
//! They are ephemeral and never persisted.

use serde::{Deserialize, Serialize};

/// Enumeration of all lifecycle event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GhostEventKind {
    /// A ghost became the active one.
    Activate,
    /// A ghost lost active status.
    Deactivate,
    /// The active ghost was clicked.
    Click,
    /// The active ghost was right-clicked.
    RightClick,
    /// Global shortcut 1 was pressed.
    #[serde(rename = "pushSC1")]
    PushSc1,
    /// Global shortcut 2 was pressed.
    #[serde(rename = "pushSC2")]
    PushSc2,
    /// Global shortcut 3 was pressed.
    #[serde(rename = "pushSC3")]
    PushSc3,
    /// The sub shortcut was pressed.
    PushSub,
}

impl GhostEventKind {
    /// Returns the wire name of this event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Click => "click",
            Self::RightClick => "rightClick",
            Self::PushSc1 => "pushSC1",
            Self::PushSc2 => "pushSC2",
            Self::PushSc3 => "pushSC3",
            Self::PushSub => "pushSub",
        }
    }
}

impl std::fmt::Display for GhostEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A lifecycle event for a single ghost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhostEvent {
    /// What happened.
    pub kind: GhostEventKind,
    /// The ghost the event concerns.
    pub ghost_id: String,
    /// Optional event payload.
    pub payload: Option<serde_json::Value>,
}

impl GhostEvent {
    /// Create a new event without a payload.
    pub fn new(kind: GhostEventKind, ghost_id: impl Into<String>) -> Self {
        Self {
            kind,
            ghost_id: ghost_id.into(),
            payload: None,
        }
    }

    /// Create a new event carrying a payload.
    pub fn with_payload(
        kind: GhostEventKind,
        ghost_id: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            kind,
            ghost_id: ghost_id.into(),
            payload: Some(payload),
        }
    }
}
