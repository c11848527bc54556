//! Per-widget call lifecycle controller.

use std::sync::Arc;

use tracing::{debug, error, info};

use podium_types::{ConnectionPhase, SdkEvent, TranscriptEntry, WidgetConfig};
use podium_voice::{VoiceClient, VoiceError, VoiceTransport};

use crate::coordinator::CallCoordinator;
use crate::error::WidgetError;
use crate::view::{self, WidgetView, CALL_IN_PROGRESS_MESSAGE};

/// One widget's connection state machine.
///
/// Lives from widget mount to unmount. The SDK client is created with the
/// controller and force-stopped when the controller is dropped, whatever
/// phase it is in. Every state transition happens either in a local user
/// operation or in [`handle_event`](Self::handle_event), the single
/// transition function over the session's inbound event stream.
pub struct WidgetController {
    config: WidgetConfig,
    client: Arc<VoiceClient>,
    coordinator: CallCoordinator,
    phase: ConnectionPhase,
    speaking: bool,
    muted: bool,
    transcript: Vec<TranscriptEntry>,
    last_error: Option<VoiceError>,
}

impl WidgetController {
    /// Mounts a widget: builds its SDK client from the configured API key
    /// and binds it to the call scope via `coordinator`.
    pub fn new(
        config: WidgetConfig,
        coordinator: CallCoordinator,
        transport: Arc<dyn VoiceTransport>,
    ) -> Result<Self, WidgetError> {
        let client = Arc::new(VoiceClient::new(config.api_key.clone(), transport)?);
        Ok(Self {
            config,
            client,
            coordinator,
            phase: ConnectionPhase::Idle,
            speaking: false,
            muted: false,
            transcript: Vec::new(),
            last_error: None,
        })
    }

    /// The SDK client handle, for transports and hosts that deliver events.
    pub fn client(&self) -> &Arc<VoiceClient> {
        &self.client
    }

    pub fn widget_id(&self) -> &str {
        &self.config.widget_id
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn speaking(&self) -> bool {
        self.speaking
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn last_error(&self) -> Option<&VoiceError> {
        self.last_error.as_ref()
    }

    /// Requests a call start.
    ///
    /// Returns `Ok(false)` when another widget's call blocks the start (a
    /// soft condition: the view renders a disabled affordance with
    /// [`CALL_IN_PROGRESS_MESSAGE`], nothing is mutated). Otherwise the
    /// coordinator slot is claimed synchronously (before the SDK confirms),
    /// the previous session's transcript is cleared, the phase flips to
    /// `Connecting`, and the SDK start command is issued.
    pub fn start_call(&mut self) -> Result<bool, WidgetError> {
        if self.phase.in_call() {
            debug!(widget_id = %self.config.widget_id, "start ignored: already in a call");
            return Ok(true);
        }

        if !self.coordinator.start_call(&self.config.widget_id)? {
            info!(
                widget_id = %self.config.widget_id,
                "start blocked: another widget's call is active"
            );
            return Ok(false);
        }

        self.transcript.clear();
        self.last_error = None;
        self.speaking = false;
        self.phase = ConnectionPhase::Connecting;
        info!(
            widget_id = %self.config.widget_id,
            assistant_id = %self.config.assistant_id,
            "call starting"
        );
        self.client.start(&self.config.assistant_id);
        Ok(true)
    }

    /// Aborts a start that the SDK has not yet confirmed.
    ///
    /// Sends a stop to the SDK and releases the slot. The SDK may still
    /// deliver a late `call-start`; [`handle_event`](Self::handle_event)
    /// treats that as a resync, not a reopen.
    pub fn cancel_call(&mut self) -> Result<(), WidgetError> {
        if self.phase != ConnectionPhase::Connecting {
            debug!(widget_id = %self.config.widget_id, "cancel ignored: not connecting");
            return Ok(());
        }

        info!(widget_id = %self.config.widget_id, "call cancelled before confirmation");
        self.client.stop();
        self.release_if_held()?;
        self.phase = ConnectionPhase::Idle;
        self.speaking = false;
        Ok(())
    }

    /// Ends a live call (user-initiated).
    pub fn end_call(&mut self) -> Result<(), WidgetError> {
        if self.phase != ConnectionPhase::Connected {
            debug!(widget_id = %self.config.widget_id, "end ignored: no live call");
            return Ok(());
        }

        info!(widget_id = %self.config.widget_id, "call ended by user");
        self.client.stop();
        self.finish_call()
    }

    /// Toggles the local mute flag and mirrors it to the SDK.
    ///
    /// Independent of the connection phase; with no session the transport
    /// command is a no-op, never an error. Returns the new flag.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.client.set_muted(self.muted);
        self.muted
    }

    /// Applies one SDK event to the state machine.
    ///
    /// Events from a session arrive in emission order and are never
    /// reordered; transcript entries are appended in arrival order.
    pub fn handle_event(&mut self, event: SdkEvent) -> Result<(), WidgetError> {
        match event {
            SdkEvent::CallStart => match self.phase {
                ConnectionPhase::Connecting => {
                    info!(widget_id = %self.config.widget_id, "call started");
                    self.phase = ConnectionPhase::Connected;
                }
                ConnectionPhase::Idle => {
                    // Confirmation lost the race against a cancel. Stop the
                    // session the SDK just opened and stay idle; the slot may
                    // already belong to another widget.
                    debug!(
                        widget_id = %self.config.widget_id,
                        "late call-start after cancel, resyncing with stop"
                    );
                    self.client.stop();
                }
                ConnectionPhase::Connected => {
                    debug!(widget_id = %self.config.widget_id, "duplicate call-start ignored");
                }
            },
            SdkEvent::CallEnd => {
                if self.phase.in_call() {
                    info!(widget_id = %self.config.widget_id, "call ended");
                }
                self.finish_call()?;
            }
            SdkEvent::SpeechStart => self.speaking = true,
            SdkEvent::SpeechEnd => self.speaking = false,
            SdkEvent::Message { message } => match message.as_transcript() {
                Some(entry) => self.transcript.push(entry),
                None => {
                    debug!(
                        widget_id = %self.config.widget_id,
                        kind = %message.kind,
                        "ignoring non-transcript message"
                    );
                }
            },
            SdkEvent::Error { message } => {
                error!(widget_id = %self.config.widget_id, %message, "voice SDK error");
                self.last_error = Some(VoiceError::Transport(message));
                if self.phase.in_call() {
                    // A transport error ends the call: stop the session and
                    // return to a recoverable idle state.
                    self.client.stop();
                    self.finish_call()?;
                }
            }
        }
        Ok(())
    }

    /// Replays a recorded event sequence through the state machine.
    pub fn replay<I>(&mut self, events: I) -> Result<(), WidgetError>
    where
        I: IntoIterator<Item = SdkEvent>,
    {
        for event in events {
            self.handle_event(event)?;
        }
        Ok(())
    }

    /// Builds the renderable snapshot of this widget.
    pub fn view(&self) -> Result<WidgetView, WidgetError> {
        let blocked = self.coordinator.has_active_call()?
            && !self.coordinator.is_call_active(&self.config.widget_id)?;
        let status = view::status_line(self.phase, self.speaking);
        let (status_title, status_detail) = match status {
            Some((title, detail)) => (Some(title), Some(detail)),
            None => (None, None),
        };

        Ok(WidgetView {
            widget_id: self.config.widget_id.clone(),
            title: self.config.title.clone(),
            description: self.config.description.clone(),
            start_button_text: self.config.start_button_text.clone(),
            phase: self.phase,
            speaking: self.speaking,
            muted: self.muted,
            transcript: self.transcript.clone(),
            status_title,
            status_detail,
            start_disabled: blocked,
            start_disabled_reason: blocked.then(|| CALL_IN_PROGRESS_MESSAGE.to_string()),
            last_error: self.last_error.as_ref().map(|e| e.to_string()),
        })
    }

    /// Terminal transition to `Idle`: releases the slot (if still ours) and
    /// resets the orthogonal flags.
    fn finish_call(&mut self) -> Result<(), WidgetError> {
        self.release_if_held()?;
        self.phase = ConnectionPhase::Idle;
        self.speaking = false;
        self.muted = false;
        Ok(())
    }

    /// Releases the coordinator slot only when this widget still holds it,
    /// so a stale cleanup can never clear another widget's claim.
    fn release_if_held(&self) -> Result<(), WidgetError> {
        if self.coordinator.is_call_active(&self.config.widget_id)? {
            self.coordinator.end_call()?;
        }
        Ok(())
    }
}

impl Drop for WidgetController {
    fn drop(&mut self) {
        // Unmount tears the SDK session down on every exit path, even if no
        // session was ever started; stop is safe without one.
        self.client.stop();
        if let Err(err) = self.release_if_held() {
            debug!(
                widget_id = %self.config.widget_id,
                %err,
                "slot release skipped on drop"
            );
        }
    }
}
