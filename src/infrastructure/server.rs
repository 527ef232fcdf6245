//! # Webhook Server
//!
//! axum endpoint receiving Telegram updates. Each usable update is signalled to its
//! conversation actor and acknowledged immediately; the turn runs in the background.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::runtime::RuntimeManager;
use crate::domain::error::RuntimeError;
use crate::infrastructure::telegram::Update;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<RuntimeManager>,
    pub secret_token: Option<String>,
}

pub fn create_router(state: AppState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(telegram_webhook))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

pub async fn telegram_webhook(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(expected) = &app.secret_token {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            tracing::warn!("Rejected webhook call with missing or wrong secret token");
            return AppError::Unauthorized.into_response();
        }
    }

    let update = match Update::parse(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::error!("Error processing message from telegram: {}", e);
            return AppError::BadRequest.into_response();
        }
    };

    let inbound = match update.normalize() {
        Ok(Some(inbound)) => inbound,
        Ok(None) => {
            tracing::warn!("Unhandled update {} of kind {}", update.update_id, update.kind());
            return StatusCode::OK.into_response();
        }
        Err(e) => {
            tracing::error!("Could not find a valid chat id for update {}: {}", update.update_id, e);
            return AppError::BadRequest.into_response();
        }
    };

    match app.runtime.signal(&inbound.chat_id, inbound.message).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e @ RuntimeError::MailboxFull(_)) => {
            tracing::warn!("{}", e);
            AppError::Busy.into_response()
        }
        Err(e) => {
            tracing::error!("Failed to signal conversation {}: {}", inbound.chat_id, e);
            AppError::Internal.into_response()
        }
    }
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest,
    Unauthorized,
    Busy,
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest => (StatusCode::BAD_REQUEST, "Could not process message"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::Busy => (StatusCode::SERVICE_UNAVAILABLE, "Conversation busy"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };
        (status, message).into_response()
    }
}
