//! Mapping of store and sync failures to HTTP responses.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use repairdesk_core::{StoreError, SyncError};

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn store_error(e: StoreError) -> ApiError {
    let status = match &e {
        StoreError::Validation { .. }
        | StoreError::InvalidContact(_)
        | StoreError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::AlreadyResolved(_) => StatusCode::CONFLICT,
        StoreError::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, e.to_string())
}

/// Backend failures are 502; local rejections keep their store status.
/// An invalid status inside a sync error came from backend data, not from
/// the client.
pub fn sync_error(e: SyncError) -> ApiError {
    match e {
        SyncError::Store(StoreError::InvalidStatus(label)) => {
            warn!(status = %label, "Backend sent an unknown status");
            api_error(
                StatusCode::BAD_GATEWAY,
                format!("Backend sent an unknown status: {}", label),
            )
        }
        SyncError::Store(e) => store_error(e),
        e => {
            warn!("Backend call failed: {}", e);
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

pub fn sync_not_configured() -> ApiError {
    api_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "Sync is not configured",
    )
}
