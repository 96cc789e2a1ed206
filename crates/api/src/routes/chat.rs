//! Conversational endpoint: one message in, one reply out.
//!
//! Confirmation phrases short-circuit the classifier entirely; everything
//! else goes through intent classification and, for destructive intents,
//! comes back as a preview awaiting confirmation.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::ChatReply;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    /// Actor identity forwarded by the authenticating front door.
    pub actor: String,
    /// Target region; defaults to the configured default region.
    pub region: Option<String>,
}

/// POST /api/v1/chat
pub async fn post_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".into()));
    }

    let reply = state
        .operations
        .handle_chat(
            request.region.as_deref(),
            &request.session_id,
            &request.message,
            &request.actor,
            state.classifier.as_deref(),
        )
        .await?;

    Ok(Json(reply))
}
