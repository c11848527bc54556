//! SDK lifecycle event vocabulary.
//!
//! A voice session produces a single ordered stream of these events. The
//! wire names (`call-start`, `speech-end`, ...) match the vendor SDK's event
//! vocabulary so frames forwarded from an embedding page deserialize
//! directly.

use serde::{Deserialize, Serialize};

use crate::{Role, TranscriptEntry};

/// The `type` value of SDK messages that carry transcript turns.
pub const MESSAGE_KIND_TRANSCRIPT: &str = "transcript";

/// An asynchronous lifecycle event emitted by the voice SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SdkEvent {
    /// The remote session is live.
    #[serde(rename = "call-start")]
    CallStart,
    /// The session ended (user- or remote-initiated).
    #[serde(rename = "call-end")]
    CallEnd,
    /// The assistant's audio started playing.
    #[serde(rename = "speech-start")]
    SpeechStart,
    /// The assistant's audio stopped playing.
    #[serde(rename = "speech-end")]
    SpeechEnd,
    /// An inbound message; only transcript-kind messages are acted on.
    #[serde(rename = "message")]
    Message { message: SdkMessage },
    /// An SDK-reported failure (network, assistant unavailable, ...).
    #[serde(rename = "error")]
    Error { message: String },
}

/// Payload of an SDK `message` event.
///
/// The SDK multiplexes several message kinds over one event; everything that
/// is not a transcript is ignored by the widget layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkMessage {
    /// Message kind discriminator (`transcript`, `function-call`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Speaker attribution, present on transcript messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Transcribed text, present on transcript messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl SdkMessage {
    /// Builds a transcript-kind message.
    pub fn transcript(role: Role, text: impl Into<String>) -> Self {
        Self {
            kind: MESSAGE_KIND_TRANSCRIPT.to_string(),
            role: Some(role),
            transcript: Some(text.into()),
        }
    }

    /// Returns the transcript entry this message carries, if it is a
    /// complete transcript-kind message.
    pub fn as_transcript(&self) -> Option<TranscriptEntry> {
        if self.kind != MESSAGE_KIND_TRANSCRIPT {
            return None;
        }
        match (self.role, self.transcript.as_ref()) {
            (Some(role), Some(text)) => Some(TranscriptEntry {
                role,
                text: text.clone(),
            }),
            _ => None,
        }
    }
}
