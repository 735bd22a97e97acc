//! Backend sync handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use repairdesk_core::{SyncStatus, SyncSummary};

use super::error::{sync_error, sync_not_configured, ApiError};
use crate::state::AppState;

/// Current sync status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SyncStatus>, ApiError> {
    let sync = state.sync().ok_or_else(sync_not_configured)?;
    Ok(Json(sync.status().await))
}

/// Refresh tickets and orders from the backend now
pub async fn refresh(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SyncSummary>, ApiError> {
    let sync = state.sync().ok_or_else(sync_not_configured)?;
    let summary = sync.refresh_all().await.map_err(sync_error)?;
    Ok(Json(summary))
}
