//! REST API endpoints.
//!
//! Axum-based HTTP API exposing the catalog views, radar geometry and
//! assistant chat sessions.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::agents::chat::ChatError;
use crate::view::ViewError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ViewError> for ApiError {
    fn from(e: ViewError) -> Self {
        match e {
            ViewError::UnknownGroup(_) | ViewError::UnknownPlayer(_) => {
                ApiError::NotFound(e.to_string())
            }
            ViewError::UnknownTab(_) => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::EmptyMessage => ApiError::BadRequest(e.to_string()),
            ChatError::Busy => ApiError::Conflict(e.to_string()),
            ChatError::UnknownSession(_) => ApiError::NotFound(e.to_string()),
            ChatError::TaskFailed(_) => ApiError::Internal(e.to_string()),
        }
    }
}

/// CORS layer for the configured origin. `*` allows any origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
            CorsLayer::new()
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    use routes::{catalog, chat};

    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/api/health", get(catalog::health))
        .route("/api/groups", get(catalog::list_groups))
        .route("/api/groups/:id/players", get(catalog::group_players))
        .route("/api/players/:id", get(catalog::player_detail))
        .route("/api/players/:id/weaknesses", get(catalog::player_weaknesses))
        .route("/api/players/:id/radar", get(catalog::player_radar))
        .route("/api/skills", get(catalog::list_skills))
        .route("/api/skills/page/:index", get(catalog::skill_page))
        .route("/api/ranking", get(catalog::ranking))
        .route("/api/radar/grid", get(catalog::radar_grid))
        .route("/api/chat/sessions", post(chat::create_session))
        .route(
            "/api/chat/sessions/:id",
            get(chat::get_session).delete(chat::delete_session),
        )
        .route("/api/chat/sessions/:id/messages", post(chat::send_message))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
