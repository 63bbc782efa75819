//! HTTP request handlers

use super::types::{ErrorResponse, HealthResponse};
use super::AppState;
use crate::line::SIGNATURE_HEADER;
use crate::reply::AUDIO_ROUTE;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::services::ServeDir;

/// Longest body prefix written to the logs
const LOGGED_BODY_CHARS: usize = 512;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let audio = ServeDir::new(&state.audio_dir);
    Router::new()
        // Messaging platform webhook
        .route("/callback", post(callback))
        // Health and version
        .route("/health", get(health))
        .route("/version", get(get_version))
        // Synthesized audio, linked from audio replies
        .nest_service(AUDIO_ROUTE, audio)
        .with_state(state)
}

// ============================================================
// Webhook
// ============================================================

async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    tracing::debug!(
        body = %truncate_for_log(&String::from_utf8_lossy(&body)),
        "Webhook request"
    );

    let events = state.webhook.authenticate(&body, signature).map_err(|e| {
        tracing::warn!(error = %e, "Rejected webhook request");
        AppError::BadRequest(e.to_string())
    })?;

    // Events are handled in delivery order; failures only affect their own event
    for event in events {
        let conversation = event.conversation.clone();
        if let Err(e) = state.runtime.handle(event).await {
            tracing::error!(conversation = %conversation, error = %e, "Event handling failed");
        }
    }

    Ok("OK")
}

fn truncate_for_log(body: &str) -> String {
    if body.chars().count() <= LOGGED_BODY_CHARS {
        return body.to_string();
    }
    let mut truncated: String = body.chars().take(LOGGED_BODY_CHARS).collect();
    truncated.push('…');
    truncated
}

// ============================================================
// Health and version
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.sessions.len().await,
        session_ttl_secs: state.sessions.ttl().map(|ttl| ttl.as_secs()),
        started_at: state.started_at,
    })
}

async fn get_version() -> &'static str {
    concat!("transvoice ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
