use axum::{extract::State, Json};
use std::sync::Arc;

use repairdesk_core::{ask, ChatReply, ChatRequest};

use crate::state::AppState;

/// Ask the support assistant. Always answers; failures degrade to the
/// canned reply.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Json<ChatReply> {
    Json(ask(state.backend(), &body.query).await)
}
