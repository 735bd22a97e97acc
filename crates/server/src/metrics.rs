//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the support desk server:
//! - HTTP request metrics (latency, counts)
//! - WebSocket connection metrics
//! - Store contents and sync state (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use regex_lite::Regex;

use repairdesk_core::{Status, TicketFilter};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "repairdesk_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("repairdesk_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "repairdesk_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// WebSocket Metrics
// =============================================================================

/// Active WebSocket connections.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "repairdesk_ws_connections_active",
        "Number of active WebSocket connections",
    )
    .unwrap()
});

/// Total WebSocket connections (cumulative).
pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "repairdesk_ws_connections_total",
        "Total WebSocket connections since startup",
    )
    .unwrap()
});

/// WebSocket messages sent by type.
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("repairdesk_ws_messages_sent_total", "WebSocket messages sent"),
        &["type"],
    )
    .unwrap()
});

/// WebSocket lag events (when client falls behind).
pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "repairdesk_ws_lag_events_total",
        "WebSocket lag events (client fell behind)",
    )
    .unwrap()
});

// =============================================================================
// Store Metrics (collected dynamically)
// =============================================================================

/// Active tickets by status.
pub static TICKETS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "repairdesk_tickets_by_status",
            "Current active ticket count by status",
        ),
        &["status"],
    )
    .unwrap()
});

/// Resolved history size.
pub static RESOLVED_TICKETS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "repairdesk_resolved_tickets",
        "Number of records in the resolved history",
    )
    .unwrap()
});

/// Order history size.
pub static ORDERS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("repairdesk_orders", "Number of records in the order history").unwrap()
});

/// Sync loop state (1 = running, 0 = stopped or not configured).
pub static SYNC_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "repairdesk_sync_running",
        "Whether the backend sync loop is running (1) or not (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // WebSocket
    registry
        .register(Box::new(WS_CONNECTIONS_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_CONNECTIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_MESSAGES_SENT.clone()))
        .unwrap();
    registry.register(Box::new(WS_LAG_EVENTS.clone())).unwrap();

    // Store
    registry
        .register(Box::new(TICKETS_BY_STATUS.clone()))
        .unwrap();
    registry
        .register(Box::new(RESOLVED_TICKETS.clone()))
        .unwrap();
    registry.register(Box::new(ORDERS.clone())).unwrap();
    registry.register(Box::new(SYNC_RUNNING.clone())).unwrap();

    // Core metrics (store operations, sync, backend, chat)
    for metric in repairdesk_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the store at scrape time.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    SYNC_RUNNING.set(match state.sync() {
        Some(sync) if sync.is_running() => 1,
        _ => 0,
    });

    let store = state.store();
    for status in Status::ALL {
        let filter = TicketFilter::new().with_status(status);
        if let Ok(count) = store.count_tickets(&filter) {
            TICKETS_BY_STATUS
                .with_label_values(&[status.label()])
                .set(count as i64);
        }
    }

    if let Ok(resolved) = store.resolved_tickets() {
        RESOLVED_TICKETS.set(resolved.len() as i64);
    }
    if let Ok(orders) = store.orders() {
        ORDERS.set(orders.len() as i64);
    }
}

static TICKET_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/TKT-\d+(/|$)").unwrap());
static ORDER_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/P-\d+(/|$)").unwrap());
static NUMERIC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = TICKET_ID.replace_all(path, "/{id}$1");
    let result = ORDER_ID.replace_all(&result, "/{id}$1");
    let result = NUMERIC_ID.replace_all(&result, "/{id}$1");
    result.to_string()
}
