use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use floorwise_retrieval::Query;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tracing::Instrument;
use uuid::Uuid;

use super::protocol::{WsIncomingMessage, WsOutgoingMessage};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let session_id = Uuid::new_v4();
        handle_socket(socket, state).instrument(tracing::info_span!("ws", session = %session_id))
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    tracing::info!("WebSocket session opened");

    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "WebSocket receive failed");
                break;
            }
        };

        let reply = respond(&state, &text).await;
        if send_json(&mut sender, &reply).await.is_err() {
            break;
        }
    }

    tracing::info!("WebSocket session closed");
}

/// Answer one text frame. Failures become error frames so the session
/// can carry on.
pub async fn respond(state: &AppState, text: &str) -> WsOutgoingMessage {
    let incoming: WsIncomingMessage = match serde_json::from_str(text) {
        Ok(incoming) => incoming,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable WebSocket frame");
            return WsOutgoingMessage::error("Expected a JSON object with message and index_name");
        }
    };

    let present = |field: Option<String>| field.filter(|value| !value.trim().is_empty());
    let (Some(message), Some(index_name)) = (present(incoming.message), present(incoming.index_name))
    else {
        return WsOutgoingMessage::error("Both message and index_name are required");
    };

    match answer(state, message, &index_name).await {
        Ok(reply) => WsOutgoingMessage::Answer { reply },
        Err(err) => WsOutgoingMessage::error(err.public_message()),
    }
}

async fn answer(state: &AppState, message: String, index_name: &str) -> Result<String, ApiError> {
    let query = Query::new(message, index_name)?;
    let answer = state.orchestrator.answer(&query).await?;
    Ok(answer.text)
}

async fn send_json(
    sender: &mut SplitSink<WebSocket, Message>,
    payload: &WsOutgoingMessage,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(payload).unwrap_or_default();
    sender.send(Message::Text(text)).await
}
