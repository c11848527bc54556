//! HTTP API handlers.

use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use podium_types::WidgetConfig;

use crate::AppState;

/// Health check handler.
///
/// Returns `200 OK` with server status and version. Used by monitoring and
/// CI to verify the server is running.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Response of `GET /api/call`.
#[derive(Debug, Serialize)]
pub struct CallStatusResponse {
    /// Widget currently holding the active call, if any.
    pub active_widget_id: Option<String>,
    /// Widgets with a live WebSocket session, sorted for stable output.
    pub live_widgets: Vec<LiveWidget>,
}

/// One live widget session.
#[derive(Debug, Serialize)]
pub struct LiveWidget {
    pub widget_id: String,
    pub connected_at: DateTime<Utc>,
}

/// Lists the configured widgets.
///
/// `api_key` never serializes, so the demo page cannot leak it.
pub async fn list_widgets_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<WidgetConfig>> {
    Json(state.widgets.clone())
}

/// Reports the coordinator snapshot and the live sessions.
pub async fn call_status_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<CallStatusResponse>, StatusCode> {
    let active_widget_id = state
        .call_scope
        .coordinator()
        .active_widget()
        .map_err(|e| {
            tracing::error!(%e, "coordinator unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let mut live_widgets: Vec<LiveWidget> = match state.sessions.read() {
        Ok(sessions) => sessions
            .iter()
            .map(|(widget_id, info)| LiveWidget {
                widget_id: widget_id.clone(),
                connected_at: info.connected_at,
            })
            .collect(),
        Err(e) => {
            tracing::error!("sessions lock poisoned: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    live_widgets.sort_by(|a, b| a.widget_id.cmp(&b.widget_id));

    Ok(Json(CallStatusResponse {
        active_widget_id,
        live_widgets,
    }))
}
