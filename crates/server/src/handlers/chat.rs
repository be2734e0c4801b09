use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use floorwise_retrieval::Query;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub index_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let query = Query::new(request.message, &request.index_name)?;
    let answer = state.orchestrator.answer(&query).await?;
    Ok(Json(ChatReply { reply: answer.text }))
}
