//! Resolved ticket history handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use repairdesk_core::ResolvedTicket;

use super::error::{api_error, store_error, ApiError};
use crate::state::AppState;

/// List resolved tickets, newest first
pub async fn list_resolved(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ResolvedTicket>>, ApiError> {
    let resolved = state.store().resolved_tickets().map_err(store_error)?;
    Ok(Json(resolved))
}

/// Add a resolved record directly
pub async fn add_resolved(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResolvedTicket>,
) -> Result<(StatusCode, Json<ResolvedTicket>), ApiError> {
    if body.id.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing required fields: id",
        ));
    }

    state
        .store()
        .add_resolved_ticket(body.clone())
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// Remove a resolved record. Unknown ids are not an error.
pub async fn remove_resolved(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store()
        .remove_resolved_ticket(&id)
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
