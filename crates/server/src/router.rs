use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{chat, health};
use crate::state::AppState;
use crate::ws::handler::ws_handler;

/// All routes plus request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health::health))
        .route("/health", get(health::health))
        .route("/chat/", post(chat::chat))
        .route("/ws/chat/", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
