use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::services::assistant::{AssistantError, ChatTurn, FALLBACK_REPLY};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub role: String,
    pub content: String,
}

fn assistant_reply(content: String) -> Json<ChatResponse> {
    Json(ChatResponse {
        role: "assistant".into(),
        content,
    })
}

/// Send a conversation to the AI support assistant. Malformed conversations
/// are validation errors; a provider failure is logged and answered with the
/// static fallback reply instead of an error page.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    if body.messages.is_empty() {
        return Err(AppError::Validation(
            "Messages array is required and cannot be empty".into(),
        ));
    }

    match state.assistant.generate(&body.messages).await {
        Ok(content) => Ok(assistant_reply(content)),
        Err(AssistantError::NoUserMessage) => Err(AppError::Validation(
            "No user message found in conversation".into(),
        )),
        Err(e) => {
            tracing::error!(user_id = %auth_user.id, error = %e, "Assistant request failed");
            Ok(assistant_reply(FALLBACK_REPLY.into()))
        }
    }
}
