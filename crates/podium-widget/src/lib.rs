//! Call coordination and the per-widget controller state machine.
//!
//! This is the core of Podium. A [`CallScope`] owns the process-wide
//! single-active-call slot; every widget gets a [`CallCoordinator`] handle
//! into it. A [`WidgetController`] drives one widget's call lifecycle
//! (idle → connecting → connected → ended), consumes the SDK's inbound
//! event stream through a single state-transition function, and enforces
//! the one-call-at-a-time invariant before a session may start.
//!
//! All operations are synchronous and non-blocking: SDK commands are
//! fire-and-forget, and their outcomes arrive later as events fed to
//! [`WidgetController::handle_event`]. That makes a whole session
//! deterministically replayable in tests.

pub mod controller;
pub mod coordinator;
pub mod error;
pub mod view;

pub use controller::WidgetController;
pub use coordinator::{CallCoordinator, CallScope};
pub use error::{CoordinatorError, WidgetError};
pub use view::WidgetView;
