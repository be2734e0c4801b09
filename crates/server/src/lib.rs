//! HTTP and WebSocket transports for the Floorwise pipeline.
//!
//! - `GET /`, `GET /health`: liveness
//! - `POST /chat/`: one question, one reply
//! - `GET /ws/chat/`: one reply frame per question frame

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod ws;

pub use error::ApiError;
pub use router::router;
pub use state::AppState;

use floorwise_core::{AppError, AppResult};
use floorwise_retrieval::ChatOrchestrator;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, orchestrator: ChatOrchestrator) -> AppResult<()> {
    let state = Arc::new(AppState::new(orchestrator));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Other(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
