//! Order history handlers.
//!
//! Without a backend, `POST /orders` records a complete [`Order`]. With one,
//! the body is a component request that the backend turns into an order.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use repairdesk_core::sync::NewBackendOrder;
use repairdesk_core::Order;

use super::error::{api_error, store_error, sync_error, sync_not_configured, ApiError};
use crate::state::AppState;

/// Request body for changing an order's status on the backend
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusBody {
    pub status: String,
}

fn invalid_body(e: serde_json::Error) -> ApiError {
    api_error(
        StatusCode::BAD_REQUEST,
        format!("Invalid order: {}", e),
    )
}

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.store().orders().map_err(store_error)?;
    Ok(Json(orders))
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = match state.sync() {
        Some(sync) => {
            let request: NewBackendOrder = serde_json::from_value(body).map_err(invalid_body)?;
            sync.create_order(&request).await.map_err(sync_error)?
        }
        None => {
            let order: Order = serde_json::from_value(body).map_err(invalid_body)?;
            if order.id.trim().is_empty() {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "Missing required fields: id",
                ));
            }
            state.store().add_order(order.clone()).map_err(store_error)?;
            order
        }
    };

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateOrderStatusBody>,
) -> Result<Json<Order>, ApiError> {
    let sync = state.sync().ok_or_else(sync_not_configured)?;
    let order = sync
        .update_order_status(&id, &body.status)
        .await
        .map_err(sync_error)?;
    Ok(Json(order))
}

pub async fn remove_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store().remove_order(&id).map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
