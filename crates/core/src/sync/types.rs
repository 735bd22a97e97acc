//! Backend record shapes, the backend trait and sync errors.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ticket::{StoreError, TicketDetails};

/// Identifier as sent by the backend (integer primary key or string).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Product reference embedded in a backend ticket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BackendProduct {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Ticket record as returned by the backend. Every field except the id may
/// be missing or null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendTicket {
    pub id: RecordId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub product: Option<BackendProduct>,
    #[serde(default)]
    pub pickup_date: Option<String>,
    #[serde(default)]
    pub preferred_time_slot: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub pickup_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Component order record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendOrder {
    pub id: RecordId,
    /// Human order reference ("P-1234"); preferred over `id` when present.
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub component_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service_tier: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Payload for creating a ticket on the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBackendTicket {
    pub description: String,
    pub status: String,
    pub pickup_date: String,
    pub preferred_time_slot: String,
    pub contact: String,
    pub pickup_address: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub notes: String,
}

impl NewBackendTicket {
    pub fn from_details(details: &TicketDetails, status: &str) -> Self {
        Self {
            description: details.issue.clone(),
            status: status.to_string(),
            pickup_date: details.pickup_date.clone(),
            preferred_time_slot: details.time_slot.clone(),
            contact: details.contact_number.clone(),
            pickup_address: details.address.clone(),
            notes: details.notes.clone(),
        }
    }
}

/// Payload for ordering a component on the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBackendOrder {
    /// "mobile", "tv" or "laptop".
    pub device_type: String,
    pub component_name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Backend request timeout")]
    Timeout,

    #[error("Backend API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    #[error("Store rejected backend data: {0}")]
    Store(#[from] StoreError),
}

/// The ticketing backend mirrored by the sync layer.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// All tickets visible to this client.
    async fn fetch_tickets(&self) -> Result<Vec<BackendTicket>, SyncError>;

    /// Create a ticket, returning the stored record.
    async fn create_ticket(&self, ticket: &NewBackendTicket) -> Result<BackendTicket, SyncError>;

    /// Change a ticket's status, returning the updated record.
    async fn update_ticket_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<BackendTicket, SyncError>;

    /// All component orders visible to this client.
    async fn fetch_orders(&self) -> Result<Vec<BackendOrder>, SyncError>;

    /// Order a component, returning the stored record.
    async fn create_order(&self, order: &NewBackendOrder) -> Result<BackendOrder, SyncError>;

    /// Change an order's status, returning the updated record.
    async fn update_order_status(&self, id: &str, status: &str)
        -> Result<BackendOrder, SyncError>;

    /// Ask the support assistant. Returns the raw reply text.
    async fn chat(&self, query: &str) -> Result<String, SyncError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_ticket_tolerates_nulls() {
        let json = r#"{
            "id": 7,
            "description": null,
            "status": "Picked",
            "customer_id": 1,
            "created_at": "2025-10-20T10:30:00"
        }"#;
        let ticket: BackendTicket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id, RecordId::Number(7));
        assert!(ticket.description.is_none());
        assert!(ticket.product.is_none());
        assert_eq!(ticket.status.as_deref(), Some("Picked"));
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::Number(42).to_string(), "42");
        assert_eq!(RecordId::Text("TKT-1".to_string()).to_string(), "TKT-1");
    }

    #[test]
    fn test_new_backend_ticket_from_details() {
        let details = TicketDetails {
            product: "laptop".to_string(),
            issue: "Fan noise".to_string(),
            pickup_date: "2025-10-25".to_string(),
            time_slot: "10:00 AM - 12:00 PM".to_string(),
            address: "1 Elm St".to_string(),
            contact_number: "9876543210".to_string(),
            ..Default::default()
        };
        let payload = NewBackendTicket::from_details(&details, "Not Picked");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["description"], "Fan noise");
        assert_eq!(json["preferred_time_slot"], "10:00 AM - 12:00 PM");
        assert_eq!(json["contact"], "9876543210");
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_sync_error_from_store_error() {
        let err: SyncError = StoreError::InvalidStatus("Open".to_string()).into();
        assert!(matches!(err, SyncError::Store(StoreError::InvalidStatus(_))));
        assert!(err.to_string().contains("Open"));
    }
}
