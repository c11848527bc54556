//! Per-widget voice SDK client handle.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use podium_types::SdkEvent;

use crate::error::VoiceError;
use crate::transport::VoiceTransport;

/// Capacity of the per-client event broadcast channel.
const DEFAULT_EVENT_BROADCAST_CAPACITY: usize = 256;

/// A client for one widget's voice sessions.
///
/// Instantiated per widget with the vendor API key. Commands are forwarded
/// to the [`VoiceTransport`]; the SDK's asynchronous lifecycle notifications
/// come back as a single ordered [`SdkEvent`] stream, consumed via
/// [`VoiceClient::subscribe`]. Transport implementations deliver events
/// through [`VoiceClient::emit`].
pub struct VoiceClient {
    api_key: String,
    transport: Arc<dyn VoiceTransport>,
    event_tx: broadcast::Sender<SdkEvent>,
}

impl fmt::Debug for VoiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceClient")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl VoiceClient {
    /// Creates a client from an API key and a transport.
    ///
    /// # Errors
    ///
    /// Returns [`VoiceError::Config`] if the API key is empty.
    pub fn new(
        api_key: impl Into<String>,
        transport: Arc<dyn VoiceTransport>,
    ) -> Result<Self, VoiceError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(VoiceError::Config("API key must not be empty".to_string()));
        }

        let (event_tx, _) = broadcast::channel(DEFAULT_EVENT_BROADCAST_CAPACITY);
        Ok(Self {
            api_key,
            transport,
            event_tx,
        })
    }

    /// Returns the vendor API key this client was created with.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Begins a session with the given assistant. Completion arrives later
    /// as a `call-start` event.
    pub fn start(&self, assistant_id: &str) {
        debug!(assistant_id, "voice client start");
        self.transport.start(assistant_id);
    }

    /// Ends or aborts the session. Safe to call with no active session.
    pub fn stop(&self) {
        debug!("voice client stop");
        self.transport.stop();
    }

    /// Mirrors the local mute flag to the transport. A no-op on the
    /// transport side when no session exists.
    pub fn set_muted(&self, muted: bool) {
        debug!(muted, "voice client set_muted");
        self.transport.set_muted(muted);
    }

    /// Subscribes to the session event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SdkEvent> {
        self.event_tx.subscribe()
    }

    /// Delivers an SDK event to all subscribers.
    ///
    /// Called by transport implementations (and by test harnesses replaying
    /// recorded sessions). Send failures mean no subscriber is listening,
    /// which is not an error for a fire-and-forget notification.
    pub fn emit(&self, event: SdkEvent) {
        let _ = self.event_tx.send(event);
    }
}
