//! Shared types for the Podium voice-widget platform.
//!
//! This crate provides the foundational types used across all Podium crates:
//! the widget configuration surface, the connection phase enumeration, the
//! transcript model, and the SDK event vocabulary.
//!
//! No crate in the workspace depends on anything *except* `podium-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

pub mod event;
pub mod widget;

pub use event::{SdkEvent, SdkMessage, MESSAGE_KIND_TRANSCRIPT};
pub use widget::WidgetConfig;

use serde::{Deserialize, Serialize};

/// Attribution of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The human caller.
    User,
    /// The remote AI assistant.
    Assistant,
}

impl Role {
    /// Returns the string label for this role.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of a call transcript.
///
/// Entries are append-only; their order is the arrival order of the SDK
/// `message` events that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Who spoke this turn.
    pub role: Role,
    /// The transcribed text.
    pub text: String,
}

/// Connection phase of a widget's call.
///
/// `Connecting` covers the window between the local start request and the
/// SDK's asynchronous confirmation; the terminal transition back to `Idle`
/// happens on end, cancel, or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    /// No call.
    #[default]
    Idle,
    /// Start requested, SDK has not yet confirmed.
    Connecting,
    /// SDK confirmed the call is live.
    Connected,
}

impl ConnectionPhase {
    /// True while a session exists or is being set up.
    pub fn in_call(self) -> bool {
        !matches!(self, Self::Idle)
    }
}
