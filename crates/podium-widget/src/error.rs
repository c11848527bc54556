use podium_voice::VoiceError;
use thiserror::Error;

/// Errors raised by [`crate::CallCoordinator`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The coordinator handle outlived its owning [`crate::CallScope`].
    ///
    /// This is a programmer error: a widget kept using its handle after the
    /// scope that owns the active-call slot was torn down. It fails loudly
    /// instead of defaulting to "no call active".
    #[error("call coordinator used outside its owning call scope")]
    ContextMissing,
}

/// Errors raised by the widget controller.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Coordinator access failed.
    #[error("coordinator failure: {0}")]
    Coordinator(#[from] CoordinatorError),

    /// Voice client construction or configuration failed.
    #[error("voice client failure: {0}")]
    Voice(#[from] VoiceError),
}
