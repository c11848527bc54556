//! The command surface of the vendor voice SDK.

use std::sync::Mutex;

/// Fire-and-forget commands a widget issues against its voice session.
///
/// Implementations must not block: every method returns immediately, and the
/// eventual outcome (session live, session ended, failure) is delivered as
/// an event on the owning [`crate::VoiceClient`]'s channel. `stop` and
/// `set_muted` must be safe to call when no session exists.
pub trait VoiceTransport: Send + Sync {
    /// Begins a session with the given assistant.
    fn start(&self, assistant_id: &str);

    /// Ends or aborts the session, if any.
    fn stop(&self);

    /// Sets the local microphone mute state on the transport.
    fn set_muted(&self, muted: bool);
}

/// A command observed by [`NullTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Start(String),
    Stop,
    SetMuted(bool),
}

/// Inert transport for tests and offline demo hosting.
///
/// Commands are recorded and otherwise ignored; no events are produced. In a
/// deployment with the real SDK linked in, a binding crate implements
/// [`VoiceTransport`] against the vendor client instead.
#[derive(Debug, Default)]
pub struct NullTransport {
    commands: Mutex<Vec<TransportCommand>>,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the commands issued so far, in order.
    pub fn commands(&self) -> Vec<TransportCommand> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    fn record(&self, command: TransportCommand) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }
    }
}

impl VoiceTransport for NullTransport {
    fn start(&self, assistant_id: &str) {
        self.record(TransportCommand::Start(assistant_id.to_string()));
    }

    fn stop(&self) {
        self.record(TransportCommand::Stop);
    }

    fn set_muted(&self, muted: bool) {
        self.record(TransportCommand::SetMuted(muted));
    }
}
