use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{chat, handlers, orders, resolved, stats, sync, tickets, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Tickets
        .route("/tickets", post(tickets::create_ticket))
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets/{id}", get(tickets::get_ticket))
        .route("/tickets/{id}", delete(tickets::delete_ticket))
        .route("/tickets/{id}/status", put(tickets::update_status))
        .route("/tickets/{id}/resolve", post(tickets::resolve_ticket))
        // Resolved history
        .route("/resolved", get(resolved::list_resolved))
        .route("/resolved", post(resolved::add_resolved))
        .route("/resolved/{id}", delete(resolved::remove_resolved))
        // Orders
        .route("/orders", get(orders::list_orders))
        .route("/orders", post(orders::create_order))
        .route("/orders/{id}", delete(orders::remove_order))
        .route("/orders/{id}/status", put(orders::update_order_status))
        // Dashboard stats
        .route("/stats", get(stats::get_stats))
        .route("/stats/agents", get(stats::get_agents))
        // Backend sync
        .route("/sync", get(sync::get_status))
        .route("/sync", post(sync::refresh))
        // Support chat
        .route("/chat", post(chat::chat))
        // Live updates
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
        .layer(middleware::from_fn(super::middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
