//! Ticket API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use repairdesk_core::{
    CreateTicketRequest, ResolveRequest, ResolvedTicket, Status, Ticket, TicketDetails,
    TicketFilter,
};

use super::error::{api_error, store_error, sync_error, ApiError};
use crate::state::AppState;

/// Maximum allowed limit for ticket queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for ticket queries
const DEFAULT_LIMIT: i64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
    #[serde(flatten)]
    pub details: TicketDetails,
    /// Initial status label (defaults to "Not Picked")
    pub status: Option<String>,
}

/// Request body for changing a ticket's status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: String,
}

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    /// Filter by status label
    pub status: Option<String>,
    /// Maximum number of tickets to return
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<Ticket>,
    pub total: usize,
    pub limit: i64,
    pub offset: i64,
}

fn parse_status(label: &str) -> Result<Status, ApiError> {
    label.parse().map_err(store_error)
}

fn not_found(id: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Ticket not found: {}", id))
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new ticket
///
/// With a backend configured the ticket is created there first and the
/// backend's record is returned.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let mut request = CreateTicketRequest::new(body.details);
    if let Some(label) = body.status.as_deref() {
        request = request.with_status(parse_status(label)?);
    }

    let ticket = match state.sync() {
        Some(sync) => sync.create_ticket(request).await.map_err(sync_error)?,
        None => state.store().create_ticket(request).map_err(store_error)?,
    };

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    match state.store().get_ticket(&id).map_err(store_error)? {
        Some(ticket) => Ok(Json(ticket)),
        None => Err(not_found(&id)),
    }
}

/// List active tickets with optional status filter
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = TicketFilter::new()
        .with_limit(limit as usize)
        .with_offset(offset as usize);

    if let Some(ref label) = params.status {
        filter = filter.with_status(parse_status(label)?);
    }

    let tickets = state.store().list_tickets(&filter).map_err(store_error)?;
    // Count ignores pagination
    let total = state.store().count_tickets(&filter).map_err(store_error)?;

    Ok(Json(ListTicketsResponse {
        tickets,
        total,
        limit,
        offset,
    }))
}

/// Move a ticket to another status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<Ticket>, ApiError> {
    let status = parse_status(&body.status)?;

    let ticket = match state.sync() {
        Some(sync) => sync
            .update_ticket_status(&id, status)
            .await
            .map_err(sync_error)?,
        None => state.store().set_status(&id, status).map_err(store_error)?,
    };

    Ok(Json(ticket))
}

/// Resolve a ticket into the resolved history
pub async fn resolve_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ResolveRequest>,
) -> Result<(StatusCode, Json<ResolvedTicket>), ApiError> {
    let mut missing = Vec::new();
    if body.resolution.trim().is_empty() {
        missing.push("resolution");
    }
    if body.resolved_by.trim().is_empty() {
        missing.push("resolvedBy");
    }
    if !missing.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Missing required fields: {}", missing.join(", ")),
        ));
    }

    let resolved = state
        .store()
        .resolve_ticket(&id, body)
        .map_err(store_error)?;
    info!(ticket_id = %id, "Ticket resolved via API");

    Ok((StatusCode::CREATED, Json(resolved)))
}

/// Delete an active ticket. Unknown ids are not an error.
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store().delete_ticket(&id).map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
