//! Change notifications emitted by the ticket store.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::Status;

/// Default capacity of the store's event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A committed mutation of the store.
///
/// Exactly one event is sent per successful operation, while the store lock
/// is still held, so subscribers see mutations in commit order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StoreEvent {
    TicketCreated {
        ticket_id: String,
        status: Status,
    },
    StatusChanged {
        ticket_id: String,
        from: Status,
        to: Status,
    },
    /// An active ticket was overwritten with a backend record.
    TicketUpdated {
        ticket_id: String,
        status: Status,
    },
    TicketResolved {
        ticket_id: String,
        resolved_by: String,
        /// True if the ticket was taken out of the active list.
        archived: bool,
    },
    TicketDeleted {
        ticket_id: String,
    },
    ResolvedTicketAdded {
        ticket_id: String,
    },
    ResolvedTicketRemoved {
        ticket_id: String,
    },
    OrderAdded {
        order_id: String,
    },
    OrderUpdated {
        order_id: String,
    },
    OrderRemoved {
        order_id: String,
    },
    /// Collections were replaced wholesale; counts are `None` for
    /// collections that were left untouched.
    Replaced {
        tickets: Option<usize>,
        resolved_tickets: Option<usize>,
        orders: Option<usize>,
    },
}

impl StoreEvent {
    /// Event type as a string (for metrics labels and logs).
    pub fn event_type(&self) -> &'static str {
        match self {
            StoreEvent::TicketCreated { .. } => "ticket_created",
            StoreEvent::StatusChanged { .. } => "status_changed",
            StoreEvent::TicketUpdated { .. } => "ticket_updated",
            StoreEvent::TicketResolved { .. } => "ticket_resolved",
            StoreEvent::TicketDeleted { .. } => "ticket_deleted",
            StoreEvent::ResolvedTicketAdded { .. } => "resolved_ticket_added",
            StoreEvent::ResolvedTicketRemoved { .. } => "resolved_ticket_removed",
            StoreEvent::OrderAdded { .. } => "order_added",
            StoreEvent::OrderUpdated { .. } => "order_updated",
            StoreEvent::OrderRemoved { .. } => "order_removed",
            StoreEvent::Replaced { .. } => "replaced",
        }
    }
}

/// Fan-out of store events to any number of subscribers.
///
/// Cheaply cloneable. Sending never blocks or fails the caller; with no
/// subscribers the event is dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: StoreEvent) {
        tracing::debug!(event = event.event_type(), "Store event");
        // No receivers is not an error.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
