use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use repairdesk_core::{agent_performance, AgentPerformance, AgentSort, DashboardStats};

use super::error::{api_error, store_error, ApiError};
use crate::state::AppState;

/// Query parameters for the agent table
#[derive(Debug, Deserialize)]
pub struct AgentParams {
    /// "resolved" (default) or "name"
    pub sort: Option<String>,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, ApiError> {
    let snapshot = state.store().snapshot().map_err(store_error)?;
    Ok(Json(DashboardStats::from_snapshot(&snapshot)))
}

pub async fn get_agents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AgentParams>,
) -> Result<Json<Vec<AgentPerformance>>, ApiError> {
    let sort = match params.sort.as_deref() {
        Some(sort) => sort
            .parse::<AgentSort>()
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?,
        None => AgentSort::default(),
    };

    let snapshot = state.store().snapshot().map_err(store_error)?;
    Ok(Json(agent_performance(&snapshot, sort)))
}
