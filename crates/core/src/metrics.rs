//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ticket store (creations, status transitions, resolutions)
//! - Sync layer (refresh runs, backend requests)
//! - Support chat

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Ticket Store
// =============================================================================

/// Tickets created through the store.
pub static TICKETS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "repairdesk_tickets_created_total",
        "Total tickets created since startup",
    )
    .unwrap()
});

/// Status transitions applied by the store.
pub static STATUS_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "repairdesk_status_transitions_total",
            "Ticket status transitions",
        ),
        &["from_status", "to_status"],
    )
    .unwrap()
});

/// Tickets resolved, by resolve policy.
pub static TICKETS_RESOLVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("repairdesk_tickets_resolved_total", "Total tickets resolved"),
        &["policy"], // "retain", "archive"
    )
    .unwrap()
});

// =============================================================================
// Sync
// =============================================================================

/// Refresh runs by collection and result.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("repairdesk_sync_runs_total", "Backend refresh runs"),
        &["collection", "result"], // collection: "tickets", "orders"; result: "success", "failure"
    )
    .unwrap()
});

/// Duration of backend requests.
pub static BACKEND_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "repairdesk_backend_request_duration_seconds",
            "Duration of requests to the ticketing backend",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

/// Backend requests by endpoint and result.
pub static BACKEND_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "repairdesk_backend_requests_total",
            "Requests to the ticketing backend",
        ),
        &["endpoint", "result"],
    )
    .unwrap()
});

// =============================================================================
// Chat
// =============================================================================

/// Chat replies by source.
pub static CHAT_REPLIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("repairdesk_chat_replies_total", "Support chat replies"),
        &["source"], // "assistant", "fallback"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Store
        Box::new(TICKETS_CREATED.clone()),
        Box::new(STATUS_TRANSITIONS.clone()),
        Box::new(TICKETS_RESOLVED.clone()),
        // Sync
        Box::new(SYNC_RUNS.clone()),
        Box::new(BACKEND_REQUEST_DURATION.clone()),
        Box::new(BACKEND_REQUESTS.clone()),
        // Chat
        Box::new(CHAT_REPLIES.clone()),
    ]
}
