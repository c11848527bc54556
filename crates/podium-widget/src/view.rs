//! UI snapshot of a widget's state.
//!
//! The view is data, not markup: the embedding page renders it however it
//! likes. Field names serialize in camelCase to match the frontend frame
//! shapes.

use serde::Serialize;

use podium_types::{ConnectionPhase, TranscriptEntry};

/// Message shown on the disabled start affordance while another widget's
/// call is active.
pub const CALL_IN_PROGRESS_MESSAGE: &str =
    "Another conversation is already in progress. End it before starting a new one.";

/// A renderable snapshot of one widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub widget_id: String,
    pub title: String,
    pub description: String,
    pub start_button_text: String,
    pub phase: ConnectionPhase,
    pub speaking: bool,
    pub muted: bool,
    pub transcript: Vec<TranscriptEntry>,
    /// In-call status heading, `None` while idle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_title: Option<String>,
    /// In-call status copy, `None` while idle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_detail: Option<String>,
    /// True while another widget's call blocks this one from starting.
    pub start_disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_disabled_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Status heading and copy for an in-call widget.
pub(crate) fn status_line(phase: ConnectionPhase, speaking: bool) -> Option<(String, String)> {
    match phase {
        ConnectionPhase::Idle => None,
        ConnectionPhase::Connecting => Some((
            "Connecting".to_string(),
            "Setting up your conversation...".to_string(),
        )),
        ConnectionPhase::Connected if speaking => Some((
            "Assistant Speaking".to_string(),
            "The assistant is responding...".to_string(),
        )),
        ConnectionPhase::Connected => Some((
            "Listening".to_string(),
            "Speak now, I'm listening...".to_string(),
        )),
    }
}
