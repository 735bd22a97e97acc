//! Ticket storage trait and types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use super::{Order, ResolvedTicket, Status, StoreEvent, Ticket, TicketDetails};

/// Error type for store operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// Required fields were empty.
    #[error("Missing required fields: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    /// Contact number does not look like a phone number.
    #[error("Invalid contact number: {0}")]
    InvalidContact(String),

    /// No ticket or record with this id.
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// Status label outside the catalog.
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// A resolved record with this id already exists.
    #[error("Ticket already resolved: {0}")]
    AlreadyResolved(String),

    /// The store lock was poisoned by a panicking writer.
    #[error("Store lock error: {0}")]
    Lock(String),
}

/// What happens to an active ticket once it has been resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolvePolicy {
    /// The ticket stays in the active list, marked Delivered.
    #[default]
    Retain,
    /// The ticket is removed from the active list.
    Archive,
}

/// Request to create a new ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[serde(flatten)]
    pub details: TicketDetails,
    /// Initial status (defaults to Not Picked).
    #[serde(default)]
    pub status: Option<Status>,
}

impl CreateTicketRequest {
    pub fn new(details: TicketDetails) -> Self {
        Self {
            details,
            status: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

/// Request to resolve a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub resolution: String,
    pub resolved_by: String,
    /// Defaults to today (UTC).
    #[serde(default)]
    pub resolved_date: Option<NaiveDate>,
}

impl ResolveRequest {
    pub fn new(resolution: impl Into<String>, resolved_by: impl Into<String>) -> Self {
        Self {
            resolution: resolution.into(),
            resolved_by: resolved_by.into(),
            resolved_date: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.resolved_date = Some(date);
        self
    }
}

/// Collections to replace wholesale. `None` leaves a collection untouched.
#[derive(Debug, Clone, Default)]
pub struct ReplaceSnapshot {
    pub tickets: Option<Vec<Ticket>>,
    pub resolved_tickets: Option<Vec<ResolvedTicket>>,
    pub orders: Option<Vec<Order>>,
}

impl ReplaceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tickets(mut self, tickets: Vec<Ticket>) -> Self {
        self.tickets = Some(tickets);
        self
    }

    pub fn with_resolved_tickets(mut self, resolved: Vec<ResolvedTicket>) -> Self {
        self.resolved_tickets = Some(resolved);
        self
    }

    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.orders = Some(orders);
        self
    }
}

/// Point-in-time copy of every collection, most recent first.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub tickets: Vec<Ticket>,
    pub resolved_tickets: Vec<ResolvedTicket>,
    pub orders: Vec<Order>,
}

/// Filter for listing active tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Only tickets in this status.
    pub status: Option<Status>,
    /// Maximum number of results.
    pub limit: usize,
    /// Offset for pagination.
    pub offset: usize,
}

impl TicketFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            status: None,
            limit: 100,
            offset: 0,
        }
    }

    /// Filter by status.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub(crate) fn matches(&self, ticket: &Ticket) -> bool {
        self.status.is_none_or(|status| ticket.status() == status)
    }
}

/// Trait for ticket store backends.
///
/// Every mutating operation is atomic: it either commits fully and emits one
/// [`StoreEvent`], or fails and leaves the store unchanged.
pub trait TicketStore: Send + Sync {
    /// Validate and insert a new ticket at the front of the active list.
    fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, StoreError>;

    /// Get an active ticket by id.
    fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, StoreError>;

    /// List active tickets matching the filter, most recent first.
    fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, StoreError>;

    /// Count active tickets matching the filter (ignores pagination).
    fn count_tickets(&self, filter: &TicketFilter) -> Result<usize, StoreError>;

    /// Move a ticket to `status`, regenerating its steps.
    fn set_status(&self, id: &str, status: Status) -> Result<Ticket, StoreError>;

    /// Mark a ticket Delivered and record it as resolved.
    fn resolve_ticket(&self, id: &str, request: ResolveRequest)
        -> Result<ResolvedTicket, StoreError>;

    /// Replace the active ticket with the same id in place, or insert it at
    /// the front. Used to commit records the backend already holds.
    fn upsert_ticket(&self, ticket: Ticket) -> Result<(), StoreError>;

    /// Remove an active ticket. Returns false if it was not present.
    fn delete_ticket(&self, id: &str) -> Result<bool, StoreError>;

    /// Resolved records, most recent first.
    fn resolved_tickets(&self) -> Result<Vec<ResolvedTicket>, StoreError>;

    /// Insert a resolved record directly (history imports).
    fn add_resolved_ticket(&self, resolved: ResolvedTicket) -> Result<(), StoreError>;

    /// Remove a resolved record. Returns false if it was not present.
    fn remove_resolved_ticket(&self, id: &str) -> Result<bool, StoreError>;

    /// Orders, most recent first.
    fn orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Insert an order at the front.
    fn add_order(&self, order: Order) -> Result<(), StoreError>;

    /// Replace the order with the same id in place, or insert it at the front.
    fn upsert_order(&self, order: Order) -> Result<(), StoreError>;

    /// Remove an order. Returns false if it was not present.
    fn remove_order(&self, id: &str) -> Result<bool, StoreError>;

    /// Replace the provided collections wholesale (no merging).
    fn replace_all(&self, snapshot: ReplaceSnapshot) -> Result<(), StoreError>;

    /// Copy of all collections.
    fn snapshot(&self) -> Result<StoreSnapshot, StoreError>;

    /// Receive an event for every committed mutation.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
