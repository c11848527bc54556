//! Podium demo server library logic.
//!
//! Hosts the widget controllers behind a small HTTP/WebSocket surface: the
//! embedding page fetches the configured widgets, opens one WebSocket per
//! rendered widget, sends user commands (`start`, `cancel`, `end`,
//! `toggle-mute`) and SDK lifecycle events, and receives a fresh
//! [`podium_widget::WidgetView`] snapshot after every applied input.

pub mod api;
pub mod api_ws;
pub mod config;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{routing::get, Extension, Router};
use chrono::{DateTime, Utc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use podium_types::WidgetConfig;
use podium_widget::CallScope;

/// A live widget WebSocket session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Unique id of the connection; a reconnect for the same widget gets a
    /// new one, and stale cleanups are ignored by id mismatch.
    pub session_id: Uuid,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
}

/// Application state shared across all request handlers.
pub struct AppState {
    /// Widgets rendered on the demo page, in configuration order.
    pub widgets: Vec<WidgetConfig>,
    /// Owner of the single active-call slot. Lives as long as the server;
    /// every controller gets a coordinator handle from it.
    pub call_scope: CallScope,
    /// Live widget sessions (widget_id -> session info).
    ///
    /// Uses `std::sync::RwLock` intentionally: all lock acquisitions are
    /// brief HashMap operations that never span `.await` points.
    pub sessions: Arc<RwLock<HashMap<String, SessionInfo>>>,
}

impl AppState {
    /// Builds state from the resolved widget configurations.
    pub fn new(widgets: Vec<WidgetConfig>) -> Self {
        Self {
            widgets,
            call_scope: CallScope::new(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Looks up a widget configuration by id.
    pub fn widget(&self, widget_id: &str) -> Option<WidgetConfig> {
        self.widgets
            .iter()
            .find(|w| w.widget_id == widget_id)
            .cloned()
    }
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/health", get(api::health))
        .route("/api/widgets", get(api::list_widgets_handler))
        .route("/api/call", get(api::call_status_handler))
        .route("/ws/widget/{widgetId}", get(api_ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(state))
}
