//! Mock ticketing backend for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::sync::{
    Backend, BackendOrder, BackendTicket, NewBackendOrder, NewBackendTicket, RecordId, SyncError,
};

/// Reply returned by [`MockBackend::chat`] unless changed.
pub const MOCK_CHAT_REPLY: &str = "Please restart the device and try again.";

/// Mock implementation of the Backend trait.
///
/// Provides controllable behavior for testing:
/// - Serve configurable ticket and order lists
/// - Record created tickets, created orders and chat queries
/// - Simulate failures with `set_next_error`
///
/// # Example
///
/// ```rust,ignore
/// use repairdesk_core::testing::MockBackend;
///
/// let backend = MockBackend::new();
/// backend.set_tickets(vec![/* records */]).await;
///
/// // Next call fails
/// backend.set_next_error(SyncError::Timeout).await;
/// ```
#[derive(Debug)]
pub struct MockBackend {
    /// Tickets served by `fetch_tickets`.
    tickets: Arc<RwLock<Vec<BackendTicket>>>,
    /// Orders served by `fetch_orders`.
    orders: Arc<RwLock<Vec<BackendOrder>>>,
    /// Payloads received by `create_ticket`.
    created_tickets: Arc<RwLock<Vec<NewBackendTicket>>>,
    /// Payloads received by `create_order`.
    created_orders: Arc<RwLock<Vec<NewBackendOrder>>>,
    /// Queries received by `chat`.
    chat_queries: Arc<RwLock<Vec<String>>>,
    /// Reply text for `chat`.
    chat_reply: Arc<RwLock<String>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<SyncError>>>,
    /// Number of `fetch_tickets` calls.
    fetch_count: Arc<RwLock<usize>>,
    /// Next numeric id for created records.
    next_id: Arc<RwLock<i64>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend with no records.
    pub fn new() -> Self {
        Self {
            tickets: Arc::new(RwLock::new(Vec::new())),
            orders: Arc::new(RwLock::new(Vec::new())),
            created_tickets: Arc::new(RwLock::new(Vec::new())),
            created_orders: Arc::new(RwLock::new(Vec::new())),
            chat_queries: Arc::new(RwLock::new(Vec::new())),
            chat_reply: Arc::new(RwLock::new(MOCK_CHAT_REPLY.to_string())),
            next_error: Arc::new(RwLock::new(None)),
            fetch_count: Arc::new(RwLock::new(0)),
            next_id: Arc::new(RwLock::new(1)),
        }
    }

    /// Replace the served tickets.
    pub async fn set_tickets(&self, tickets: Vec<BackendTicket>) {
        *self.tickets.write().await = tickets;
    }

    /// Replace the served orders.
    pub async fn set_orders(&self, orders: Vec<BackendOrder>) {
        *self.orders.write().await = orders;
    }

    /// Set the chat reply text (an empty string simulates a blank answer).
    pub async fn set_chat_reply(&self, reply: &str) {
        *self.chat_reply.write().await = reply.to_string();
    }

    /// Make the next operation fail.
    pub async fn set_next_error(&self, error: SyncError) {
        *self.next_error.write().await = Some(error);
    }

    /// Payloads received by `create_ticket`.
    pub async fn created_tickets(&self) -> Vec<NewBackendTicket> {
        self.created_tickets.read().await.clone()
    }

    /// Payloads received by `create_order`.
    pub async fn created_orders(&self) -> Vec<NewBackendOrder> {
        self.created_orders.read().await.clone()
    }

    /// Queries received by `chat`.
    pub async fn chat_queries(&self) -> Vec<String> {
        self.chat_queries.read().await.clone()
    }

    /// Number of `fetch_tickets` calls so far.
    pub async fn fetch_count(&self) -> usize {
        *self.fetch_count.read().await
    }

    async fn take_error(&self) -> Result<(), SyncError> {
        match self.next_error.write().await.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn allocate_id(&self) -> i64 {
        let mut next_id = self.next_id.write().await;
        let id = *next_id;
        *next_id += 1;
        id
    }

    fn not_found(what: &str) -> SyncError {
        SyncError::Api {
            status: 404,
            message: format!("{} not found", what),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_tickets(&self) -> Result<Vec<BackendTicket>, SyncError> {
        *self.fetch_count.write().await += 1;
        self.take_error().await?;
        Ok(self.tickets.read().await.clone())
    }

    async fn create_ticket(&self, ticket: &NewBackendTicket) -> Result<BackendTicket, SyncError> {
        self.take_error().await?;

        let record = BackendTicket {
            id: RecordId::Number(self.allocate_id().await),
            description: Some(ticket.description.clone()),
            status: Some(ticket.status.clone()),
            product: None,
            pickup_date: Some(ticket.pickup_date.clone()),
            preferred_time_slot: Some(ticket.preferred_time_slot.clone()),
            contact: Some(ticket.contact.clone()),
            pickup_address: Some(ticket.pickup_address.clone()),
            notes: Some(ticket.notes.clone()),
            created_at: None,
        };

        self.created_tickets.write().await.push(ticket.clone());
        self.tickets.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_ticket_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<BackendTicket, SyncError> {
        self.take_error().await?;

        let mut tickets = self.tickets.write().await;
        let record = tickets
            .iter_mut()
            .find(|t| t.id.to_string() == id)
            .ok_or_else(|| Self::not_found("Ticket"))?;
        record.status = Some(status.to_string());
        Ok(record.clone())
    }

    async fn fetch_orders(&self) -> Result<Vec<BackendOrder>, SyncError> {
        self.take_error().await?;
        Ok(self.orders.read().await.clone())
    }

    async fn create_order(&self, order: &NewBackendOrder) -> Result<BackendOrder, SyncError> {
        self.take_error().await?;

        let id = self.allocate_id().await;
        let record = BackendOrder {
            id: RecordId::Number(id),
            order_id: Some(format!("P-{}", 1000 + id)),
            device_type: Some(order.device_type.clone()),
            component_name: Some(order.component_name.clone()),
            status: Some("Ordered".to_string()),
            service_tier: order.service_tier.clone(),
            created_at: None,
        };

        self.created_orders.write().await.push(order.clone());
        self.orders.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<BackendOrder, SyncError> {
        self.take_error().await?;

        let mut orders = self.orders.write().await;
        let record = orders
            .iter_mut()
            .find(|o| o.order_id.as_deref() == Some(id) || o.id.to_string() == id)
            .ok_or_else(|| Self::not_found("Order"))?;
        record.status = Some(status.to_string());
        Ok(record.clone())
    }

    async fn chat(&self, query: &str) -> Result<String, SyncError> {
        self.take_error().await?;
        self.chat_queries.write().await.push(query.to_string());
        Ok(self.chat_reply.read().await.clone())
    }
}
