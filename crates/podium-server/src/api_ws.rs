//! WebSocket API handler: one connection per rendered widget.
//!
//! The embedding page opens `GET /ws/widget/{widgetId}` per widget, sends
//! [`WidgetCommand`] frames, and receives a [`WidgetFrame::View`] snapshot
//! after every applied command or SDK event. The controller lives inside
//! the connection task and is only touched from its select loop, which
//! preserves the single-threaded event-loop semantics the state machine
//! assumes.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as AxumMessage, WebSocket},
        Extension, Path, WebSocketUpgrade,
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use podium_types::{SdkEvent, WidgetConfig};
use podium_voice::{NullTransport, VoiceTransport};
use podium_widget::{WidgetController, WidgetError, WidgetView};

use crate::{AppState, SessionInfo};

/// Bound on buffered outgoing frames per connection; beyond it the client
/// is too slow and frames are dropped.
const OUTGOING_FRAME_BUFFER: usize = 256;

/// Incoming WebSocket command types.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum WidgetCommand {
    /// User pressed the start affordance.
    #[serde(rename = "start")]
    Start,
    /// User aborted before the SDK confirmed.
    #[serde(rename = "cancel")]
    Cancel,
    /// User ended a live call.
    #[serde(rename = "end")]
    End,
    /// User toggled the microphone mute flag.
    #[serde(rename = "toggle-mute")]
    ToggleMute,
    /// An SDK lifecycle event forwarded by the embedding page (which hosts
    /// the vendor SDK) or injected by a test harness.
    #[serde(rename = "sdk-event")]
    SdkEvent { event: SdkEvent },
}

/// Outgoing WebSocket frame types.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum WidgetFrame {
    #[serde(rename = "view")]
    View { view: WidgetView },
    #[serde(rename = "error")]
    Error { message: String },
}

/// WebSocket handler: `GET /ws/widget/{widgetId}`.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(widget_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let Some(config) = state.widget(&widget_id) else {
        tracing::warn!(widget_id = %widget_id, "websocket connect for unknown widget");
        return StatusCode::NOT_FOUND.into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, config))
}

/// Handles one widget connection from mount to unmount.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, config: WidgetConfig) {
    let widget_id = config.widget_id.clone();
    let session_id = Uuid::new_v4();
    register_session(&state, &widget_id, session_id);

    let transport: Arc<dyn VoiceTransport> = Arc::new(NullTransport::new());
    let mut controller =
        match WidgetController::new(config, state.call_scope.coordinator(), transport) {
            Ok(controller) => controller,
            Err(e) => {
                tracing::error!(widget_id = %widget_id, %e, "failed to mount widget controller");
                remove_session(&state, &widget_id, session_id);
                return;
            }
        };
    let mut events = controller.client().subscribe();

    let (mut sender, mut receiver) = socket.split();

    // Bounded channel so a slow consumer cannot grow memory without bound.
    let (tx, mut rx) = mpsc::channel::<String>(OUTGOING_FRAME_BUFFER);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(AxumMessage::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    tracing::info!(widget_id = %widget_id, %session_id, "widget session opened");
    push_view(&controller, &tx);

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let Some(Ok(msg)) = incoming else { break };
                match msg {
                    AxumMessage::Text(text) => {
                        match serde_json::from_str::<WidgetCommand>(&text.to_string()) {
                            Ok(command) => {
                                if let Err(e) = apply_command(&mut controller, command) {
                                    tracing::error!(widget_id = %widget_id, %e, "widget command failed");
                                    send_frame(&tx, &WidgetFrame::Error {
                                        message: e.to_string(),
                                    });
                                }
                                push_view(&controller, &tx);
                            }
                            Err(e) => {
                                tracing::warn!(
                                    widget_id = %widget_id,
                                    "unparseable widget command: {}",
                                    e
                                );
                                send_frame(&tx, &WidgetFrame::Error {
                                    message: "invalid command format".to_string(),
                                });
                            }
                        }
                    }
                    AxumMessage::Close(_) => break,
                    _ => {}
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if let Err(e) = controller.handle_event(event) {
                            tracing::error!(widget_id = %widget_id, %e, "SDK event application failed");
                        }
                        push_view(&controller, &tx);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(widget_id = %widget_id, skipped, "SDK event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::info!(widget_id = %widget_id, %session_id, "widget session closed");
    remove_session(&state, &widget_id, session_id);
    send_task.abort();
    // Dropping the controller force-stops the SDK client and releases the
    // call slot if this widget still held it.
}

fn apply_command(
    controller: &mut WidgetController,
    command: WidgetCommand,
) -> Result<(), WidgetError> {
    match command {
        // A blocked start is not an error; the refreshed view carries the
        // disabled affordance and its explanatory message.
        WidgetCommand::Start => controller.start_call().map(|_| ()),
        WidgetCommand::Cancel => controller.cancel_call(),
        WidgetCommand::End => controller.end_call(),
        WidgetCommand::ToggleMute => {
            controller.toggle_mute();
            Ok(())
        }
        WidgetCommand::SdkEvent { event } => {
            // Goes through the client channel so commands and events drain
            // from one ordered stream.
            controller.client().emit(event);
            Ok(())
        }
    }
}

fn push_view(controller: &WidgetController, tx: &mpsc::Sender<String>) {
    match controller.view() {
        Ok(view) => send_frame(tx, &WidgetFrame::View { view }),
        Err(e) => {
            tracing::error!(
                widget_id = %controller.widget_id(),
                %e,
                "failed to build widget view"
            );
        }
    }
}

fn send_frame(tx: &mpsc::Sender<String>, frame: &WidgetFrame) {
    match serde_json::to_string(frame) {
        Ok(json) => {
            if let Err(e) = tx.try_send(json) {
                tracing::warn!("dropping frame for slow consumer: {}", e);
            }
        }
        Err(e) => {
            tracing::error!("failed to serialize widget frame: {}", e);
        }
    }
}

fn register_session(state: &AppState, widget_id: &str, session_id: Uuid) {
    match state.sessions.write() {
        Ok(mut sessions) => {
            let info = SessionInfo {
                session_id,
                connected_at: chrono::Utc::now(),
            };
            if sessions.insert(widget_id.to_string(), info).is_some() {
                tracing::info!(
                    widget_id = %widget_id,
                    "replaced existing widget session"
                );
            }
        }
        Err(e) => {
            tracing::error!("sessions lock poisoned during register: {}", e);
        }
    }
}

/// Removes a session only if the id still matches, so a reconnect's
/// registration is never torn down by the stale connection's cleanup.
fn remove_session(state: &AppState, widget_id: &str, session_id: Uuid) {
    match state.sessions.write() {
        Ok(mut sessions) => {
            if sessions
                .get(widget_id)
                .is_some_and(|info| info.session_id == session_id)
            {
                sessions.remove(widget_id);
            }
        }
        Err(e) => {
            tracing::error!("sessions lock poisoned during cleanup: {}", e);
        }
    }
}
