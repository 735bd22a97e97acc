//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides a mock ticketing backend and record fixtures,
//! allowing sync and chat to be tested without a real backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use repairdesk_core::testing::{fixtures, MockBackend};
//!
//! let backend = MockBackend::new();
//! backend.set_tickets(vec![fixtures::backend_ticket(1, "In Service")]).await;
//!
//! // Use in AppState...
//! ```

mod mock_backend;

pub use mock_backend::{MockBackend, MOCK_CHAT_REPLY};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::sync::{BackendOrder, BackendProduct, BackendTicket, RecordId};
    use crate::ticket::{CreateTicketRequest, TicketDetails};

    /// Ticket details that pass validation.
    pub fn ticket_details() -> TicketDetails {
        TicketDetails {
            product: "laptop".to_string(),
            device_model: "ThinkPad X1 Carbon".to_string(),
            issue: "Screen flickering intermittently".to_string(),
            pickup_date: "2025-10-25".to_string(),
            time_slot: "10:00 AM - 12:00 PM".to_string(),
            address: "123 Main Street, Apt 4B".to_string(),
            contact_number: "+91 98765 43210".to_string(),
            notes: "Please call before pickup".to_string(),
        }
    }

    /// A create request with valid details and the default status.
    pub fn create_request() -> CreateTicketRequest {
        CreateTicketRequest::new(ticket_details())
    }

    /// A backend ticket record with a product and the given status label.
    pub fn backend_ticket(id: i64, status: &str) -> BackendTicket {
        BackendTicket {
            id: RecordId::Number(id),
            description: Some(format!("Issue #{}", id)),
            status: Some(status.to_string()),
            product: Some(BackendProduct {
                category: Some("mobile".to_string()),
                name: Some("Galaxy S24".to_string()),
            }),
            pickup_date: Some("2025-10-28".to_string()),
            preferred_time_slot: Some("2:00 PM - 4:00 PM".to_string()),
            contact: Some("9876543210".to_string()),
            pickup_address: Some("456 Oak Avenue".to_string()),
            notes: None,
            created_at: Some("2025-10-22T14:15:00".to_string()),
        }
    }

    /// A backend component order record.
    pub fn backend_order(order_id: &str, device_type: &str, component: &str) -> BackendOrder {
        BackendOrder {
            id: RecordId::Number(1),
            order_id: Some(order_id.to_string()),
            device_type: Some(device_type.to_string()),
            component_name: Some(component.to_string()),
            status: Some("Ordered".to_string()),
            service_tier: Some("Gold".to_string()),
            created_at: Some("2025-11-17T10:00:00Z".to_string()),
        }
    }
}
