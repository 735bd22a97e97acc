//! Backend record to store shape translation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{BackendOrder, BackendTicket};
use crate::ticket::{
    product_display, Order, OrderStatus, ReachedAt, Status, StoreError, Ticket, TicketDetails,
};

const UNKNOWN_PRODUCT: &str = "Unknown";
const UNKNOWN_MODEL: &str = "Unknown Model";
const NO_DESCRIPTION: &str = "No description provided";
const NOT_SPECIFIED: &str = "Not specified";
const NOT_PROVIDED: &str = "Not provided";
const DEFAULT_SERVICE_TIER: &str = "Gold";

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

/// Parse an RFC 3339 or naive ISO 8601 timestamp (naive values are UTC).
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse a backend status label. Missing or empty means Not Picked; any other
/// label outside the catalog is an error.
pub fn parse_backend_status(label: Option<&str>) -> Result<Status, StoreError> {
    match label.map(str::trim) {
        None | Some("") => Ok(Status::NotPicked),
        Some(label) => label.parse(),
    }
}

/// Translate a backend ticket, filling placeholders for missing fields.
///
/// The backend carries no per-stage instants, so the timeline is backdated
/// one day per stage from `now`.
pub fn ticket_from_backend(record: &BackendTicket, now: DateTime<Utc>) -> Result<Ticket, StoreError> {
    let status = parse_backend_status(record.status.as_deref())?;
    Ok(ticket_with_status(record, status, now))
}

/// Translate a backend ticket with an already decided status.
pub fn ticket_with_status(record: &BackendTicket, status: Status, now: DateTime<Utc>) -> Ticket {
    let product = record.product.as_ref();

    let details = TicketDetails {
        product: or_placeholder(product.and_then(|p| p.category.as_deref()), UNKNOWN_PRODUCT),
        device_model: or_placeholder(product.and_then(|p| p.name.as_deref()), UNKNOWN_MODEL),
        issue: or_placeholder(record.description.as_deref(), NO_DESCRIPTION),
        pickup_date: or_placeholder(record.pickup_date.as_deref(), &now.to_rfc3339()),
        time_slot: or_placeholder(record.preferred_time_slot.as_deref(), NOT_SPECIFIED),
        address: or_placeholder(record.pickup_address.as_deref(), NOT_PROVIDED),
        contact_number: or_placeholder(record.contact.as_deref(), NOT_PROVIDED),
        notes: record.notes.clone().unwrap_or_default(),
    };

    let created_at = record
        .created_at
        .as_deref()
        .and_then(parse_instant)
        .unwrap_or(now);

    Ticket::restore(
        record.id.to_string(),
        details,
        status,
        created_at,
        ReachedAt::backdated(status, now),
    )
}

/// Translate a batch of backend tickets. Fails on the first bad record.
pub fn tickets_from_backend(
    records: &[BackendTicket],
    now: DateTime<Utc>,
) -> Result<Vec<Ticket>, StoreError> {
    records
        .iter()
        .map(|record| ticket_from_backend(record, now))
        .collect()
}

/// Translate a backend order. `today` is used when the record has no usable
/// creation date.
pub fn order_from_backend(record: &BackendOrder, today: NaiveDate) -> Order {
    let id = record
        .order_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| record.id.to_string());

    let order_date = record
        .created_at
        .as_deref()
        .and_then(parse_instant)
        .map(|dt| dt.date_naive())
        .unwrap_or(today);

    let status = match record.status.as_deref() {
        Some("Ordered") | Some("Active") => OrderStatus::Active,
        _ => OrderStatus::Expired,
    };

    Order {
        id,
        product: product_display(
            record.device_type.as_deref().unwrap_or_default(),
            record.component_name.as_deref().unwrap_or_default(),
        ),
        order_date,
        service_tier: or_placeholder(record.service_tier.as_deref(), DEFAULT_SERVICE_TIER),
        status,
    }
}
