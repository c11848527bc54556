use thiserror::Error;

/// Errors surfaced by the voice SDK layer.
///
/// Transport failures arrive asynchronously via the SDK's `error` event and
/// are recovered locally; they never propagate past the widget layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    /// Failure reported by the SDK transport (network, assistant
    /// unavailable, ...).
    #[error("voice transport error: {0}")]
    Transport(String),

    /// Invalid client configuration.
    #[error("invalid voice configuration: {0}")]
    Config(String),
}
