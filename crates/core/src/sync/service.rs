//! Sync service: mirrors backend records into the ticket store.
//!
//! Refreshes translate the full backend snapshot before touching the store and
//! commit it with a single `replace_all`, so a failed refresh leaves the
//! store in its last-known-good state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use super::translate::{order_from_backend, ticket_with_status, tickets_from_backend};
use super::{Backend, BackendTicket, NewBackendOrder, NewBackendTicket, SyncError};
use crate::metrics;
use crate::ticket::{
    check_required, ContactValidator, CreateTicketRequest, Order, ReplaceSnapshot, Status,
    StoreError, Ticket, TicketStore,
};

/// Default interval between background refreshes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Number of records committed by a refresh.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct SyncSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickets: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<usize>,
}

/// Outcome of the most recent refresh.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: SyncSummary,
    /// Error message if the refresh failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sync service status.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    /// Whether the background loop is running.
    pub running: bool,
    pub backend: String,
    pub interval_secs: u64,
    pub last_run: Option<SyncReport>,
}

/// Drives the store from the backend: periodic refreshes plus write-through
/// operations that hit the backend first and then update the store.
pub struct SyncService {
    store: Arc<dyn TicketStore>,
    backend: Arc<dyn Backend>,
    validator: ContactValidator,
    interval: Duration,

    // Runtime state
    running: Arc<AtomicBool>,
    last_run: Arc<RwLock<Option<SyncReport>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SyncService {
    pub fn new(store: Arc<dyn TicketStore>, backend: Arc<dyn Backend>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            store,
            backend,
            validator: ContactValidator::default(),
            interval: DEFAULT_SYNC_INTERVAL,
            running: Arc::new(AtomicBool::new(false)),
            last_run: Arc::new(RwLock::new(None)),
            shutdown_tx,
        }
    }

    /// Set the interval between background refreshes.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Validator applied to contact numbers before creating remote tickets.
    pub fn with_validator(mut self, validator: ContactValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Get current sync status.
    pub async fn status(&self) -> SyncStatus {
        SyncStatus {
            running: self.is_running(),
            backend: self.backend.name().to_string(),
            interval_secs: self.interval.as_secs(),
            last_run: self.last_run.read().await.clone(),
        }
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Replace the active tickets with the backend's.
    pub async fn refresh_tickets(&self) -> Result<usize, SyncError> {
        let result = Self::refresh_tickets_inner(&self.store, &self.backend).await;
        record_run("tickets", &result);
        let summary = SyncSummary {
            tickets: result.as_ref().ok().copied(),
            orders: None,
        };
        Self::record_report(&self.last_run, summary, result.as_ref().err()).await;
        result
    }

    /// Replace the orders with the backend's.
    pub async fn refresh_orders(&self) -> Result<usize, SyncError> {
        let result = Self::refresh_orders_inner(&self.store, &self.backend).await;
        record_run("orders", &result);
        let summary = SyncSummary {
            tickets: None,
            orders: result.as_ref().ok().copied(),
        };
        Self::record_report(&self.last_run, summary, result.as_ref().err()).await;
        result
    }

    /// Replace tickets and orders together. Nothing is committed unless both
    /// collections were fetched and translated.
    pub async fn refresh_all(&self) -> Result<SyncSummary, SyncError> {
        Self::refresh_all_inner(&self.store, &self.backend, &self.last_run).await
    }

    async fn refresh_tickets_inner(
        store: &Arc<dyn TicketStore>,
        backend: &Arc<dyn Backend>,
    ) -> Result<usize, SyncError> {
        let records = backend.fetch_tickets().await?;
        let tickets = tickets_from_backend(&records, Utc::now())?;
        let count = tickets.len();

        store.replace_all(ReplaceSnapshot::new().with_tickets(tickets))?;
        debug!(count, "Tickets refreshed from backend");
        Ok(count)
    }

    async fn refresh_orders_inner(
        store: &Arc<dyn TicketStore>,
        backend: &Arc<dyn Backend>,
    ) -> Result<usize, SyncError> {
        let records = backend.fetch_orders().await?;
        let today = Utc::now().date_naive();
        let orders: Vec<Order> = records
            .iter()
            .map(|record| order_from_backend(record, today))
            .collect();
        let count = orders.len();

        store.replace_all(ReplaceSnapshot::new().with_orders(orders))?;
        debug!(count, "Orders refreshed from backend");
        Ok(count)
    }

    async fn refresh_all_inner(
        store: &Arc<dyn TicketStore>,
        backend: &Arc<dyn Backend>,
        last_run: &RwLock<Option<SyncReport>>,
    ) -> Result<SyncSummary, SyncError> {
        let result = async {
            let (ticket_records, order_records) =
                tokio::try_join!(backend.fetch_tickets(), backend.fetch_orders())?;

            let now = Utc::now();
            let tickets = tickets_from_backend(&ticket_records, now)?;
            let orders: Vec<Order> = order_records
                .iter()
                .map(|record| order_from_backend(record, now.date_naive()))
                .collect();

            let summary = SyncSummary {
                tickets: Some(tickets.len()),
                orders: Some(orders.len()),
            };
            store.replace_all(
                ReplaceSnapshot::new()
                    .with_tickets(tickets)
                    .with_orders(orders),
            )?;
            Ok::<_, SyncError>(summary)
        }
        .await;

        match &result {
            Ok(summary) => {
                metrics::SYNC_RUNS.with_label_values(&["all", "success"]).inc();
                info!(?summary, "Store refreshed from backend");
            }
            Err(e) => {
                metrics::SYNC_RUNS.with_label_values(&["all", "failure"]).inc();
                warn!("Backend refresh failed, keeping last-known-good data: {}", e);
            }
        }

        Self::record_report(
            last_run,
            result.as_ref().copied().unwrap_or_default(),
            result.as_ref().err(),
        )
        .await;
        result
    }

    async fn record_report(
        last_run: &RwLock<Option<SyncReport>>,
        summary: SyncSummary,
        error: Option<&SyncError>,
    ) {
        *last_run.write().await = Some(SyncReport {
            finished_at: Utc::now(),
            summary,
            error: error.map(|e| e.to_string()),
        });
    }

    // ========================================================================
    // Write-through operations
    // ========================================================================

    /// Create a ticket on the backend and commit the backend's record locally.
    ///
    /// Input is validated locally first so obviously bad requests never reach
    /// the backend. Once the backend has accepted the ticket the call
    /// succeeds; the follow-up refresh is best-effort.
    pub async fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, SyncError> {
        check_required(&request.details)?;
        self.validator.check(&request.details.contact_number)?;

        let requested = request.status.unwrap_or_default();
        let payload = NewBackendTicket::from_details(&request.details, requested.label());
        let record = self.backend.create_ticket(&payload).await?;

        let status = confirmed_status(&record, requested);
        let ticket = ticket_with_status(&record, status, Utc::now());
        info!(ticket_id = %ticket.id, status = %status, "Ticket created on backend");

        self.commit_ticket(&ticket);
        // Failures are logged and kept in the sync status.
        let _ = self.refresh_tickets().await;
        Ok(ticket)
    }

    /// Change a ticket's status on the backend, then apply the backend's
    /// answer to the local ticket. A ticket the store has not mirrored yet
    /// is inserted from the backend record.
    pub async fn update_ticket_status(&self, id: &str, status: Status) -> Result<Ticket, SyncError> {
        let record = self
            .backend
            .update_ticket_status(id, status.label())
            .await?;
        let confirmed = confirmed_status(&record, status);

        match self.store.set_status(id, confirmed) {
            Ok(ticket) => Ok(ticket),
            Err(StoreError::NotFound(_)) => {
                debug!(ticket_id = %id, "Ticket not mirrored yet, inserting backend record");
                let ticket = ticket_with_status(&record, confirmed, Utc::now());
                self.commit_ticket(&ticket);
                Ok(ticket)
            }
            Err(e) => {
                warn!(ticket_id = %id, "Backend status applied but local update failed: {}", e);
                Ok(ticket_with_status(&record, confirmed, Utc::now()))
            }
        }
    }

    /// Order a component on the backend and add it to the local orders.
    pub async fn create_order(&self, order: &NewBackendOrder) -> Result<Order, SyncError> {
        let record = self.backend.create_order(order).await?;
        let order = order_from_backend(&record, Utc::now().date_naive());
        info!(order_id = %order.id, "Order created on backend");

        self.commit_order(&order);
        Ok(order)
    }

    /// Change an order's status on the backend and commit the backend's
    /// record locally.
    pub async fn update_order_status(&self, id: &str, status: &str) -> Result<Order, SyncError> {
        let record = self.backend.update_order_status(id, status).await?;
        let order = order_from_backend(&record, Utc::now().date_naive());
        info!(order_id = %order.id, status = ?order.status, "Order status changed on backend");

        self.commit_order(&order);
        Ok(order)
    }

    fn commit_ticket(&self, ticket: &Ticket) {
        if let Err(e) = self.store.upsert_ticket(ticket.clone()) {
            warn!(ticket_id = %ticket.id, "Failed to store backend ticket locally: {}", e);
        }
    }

    fn commit_order(&self, order: &Order) {
        if let Err(e) = self.store.upsert_order(order.clone()) {
            warn!(order_id = %order.id, "Failed to store backend order locally: {}", e);
        }
    }

    // ========================================================================
    // Background loop
    // ========================================================================

    /// Start the periodic refresh loop (spawns a background task).
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Sync service already running");
            return;
        }

        info!(
            backend = self.backend.name(),
            interval_secs = self.interval.as_secs(),
            "Starting sync service"
        );
        self.spawn_refresh_loop();
    }

    /// Stop the refresh loop.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Sync service not running");
            return;
        }

        info!("Stopping sync service");
        let _ = self.shutdown_tx.send(());
    }

    fn spawn_refresh_loop(&self) {
        let running = Arc::clone(&self.running);
        let store = Arc::clone(&self.store);
        let backend = Arc::clone(&self.backend);
        let last_run = Arc::clone(&self.last_run);
        let interval = self.interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Sync loop started");
            // Errors are logged and reported in the status.
            let _ = Self::refresh_all_inner(&store, &backend, &last_run).await;

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Sync loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        let _ = Self::refresh_all_inner(&store, &backend, &last_run).await;
                    }
                }
            }
            info!("Sync loop stopped");
        });
    }
}

/// Status the backend reports for a record it just wrote. A missing label
/// keeps the requested status, as does a label outside the catalog, which is
/// only logged because the backend has already committed the write.
fn confirmed_status(record: &BackendTicket, requested: Status) -> Status {
    let label = record.status.as_deref().map(str::trim).filter(|l| !l.is_empty());
    let Some(label) = label else {
        return requested;
    };

    match label.parse::<Status>() {
        Ok(confirmed) => {
            if confirmed != requested {
                warn!(
                    ticket_id = %record.id,
                    requested = %requested,
                    confirmed = %confirmed,
                    "Backend applied a different status"
                );
            }
            confirmed
        }
        Err(e) => {
            warn!(
                ticket_id = %record.id,
                requested = %requested,
                "Keeping requested status, backend answered with {}",
                e
            );
            requested
        }
    }
}

fn record_run(collection: &str, result: &Result<usize, SyncError>) {
    match result {
        Ok(_) => {
            metrics::SYNC_RUNS
                .with_label_values(&[collection, "success"])
                .inc();
        }
        Err(e) => {
            metrics::SYNC_RUNS
                .with_label_values(&[collection, "failure"])
                .inc();
            warn!(collection, "Backend refresh failed: {}", e);
        }
    }
}
