use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::agents::chat::{ChatSession, ChatTurn};
use crate::api::state::AppState;
use crate::api::ApiError;

pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<ChatSession>) {
    let session = state.chat_sessions.create().await;
    info!("Opened chat session {}", session.id);
    (StatusCode::CREATED, Json(session))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatSession>, ApiError> {
    Ok(Json(state.chat_sessions.get(id).await?))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.chat_sessions.remove(id).await?;
    info!("Closed chat session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub reply: ChatTurn,
    /// True when the backend failed and the fixed fallback text was used
    pub fallback: bool,
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let reply = state
        .chat_sessions
        .send(id, &body.message, state.assistant.clone())
        .await?;

    Ok(Json(SendMessageResponse {
        fallback: reply.fallback,
        reply,
    }))
}
