//! Voice SDK client layer for Podium widgets.
//!
//! The actual audio transport, speech recognition and assistant connectivity
//! live in the vendor SDK. This crate owns the Rust-facing boundary: the
//! [`VoiceTransport`] command surface (fire-and-forget, per the SDK's
//! asynchronous model), and the per-widget [`VoiceClient`] that pairs a
//! transport with the single inbound event stream a session produces.
//!
//! Nothing here blocks: commands return immediately and their outcomes
//! arrive later as [`podium_types::SdkEvent`]s on the client's broadcast
//! channel.

pub mod client;
pub mod error;
pub mod transport;

pub use client::VoiceClient;
pub use error::VoiceError;
pub use transport::{NullTransport, TransportCommand, VoiceTransport};
