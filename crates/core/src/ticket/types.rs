//! Core ticket data types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::timeline::{project, ReachedAt, Step};
use super::Status;

// ============================================================================
// Ticket
// ============================================================================

/// Customer-supplied details of a repair request.
///
/// Every field defaults to empty on input so that missing fields surface
/// as validation errors rather than decode errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TicketDetails {
    /// Device category, e.g. "laptop", "mobile", "tv".
    pub product: String,
    /// Device model, e.g. "ThinkPad X1 Carbon".
    pub device_model: String,
    /// Problem description.
    pub issue: String,
    /// Requested pickup date.
    pub pickup_date: String,
    /// Requested pickup window, e.g. "10:00 AM - 12:00 PM".
    pub time_slot: String,
    /// Pickup address.
    pub address: String,
    /// Customer phone number.
    pub contact_number: String,
    /// Free-form notes for the pickup agent.
    pub notes: String,
}

/// An open device-repair request.
///
/// Status, stage instants and steps only change together through
/// [`Ticket::transition`], so the step list always matches the status.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique identifier (`TKT-<n>` for tickets created locally).
    pub id: String,

    #[serde(flatten)]
    pub details: TicketDetails,

    status: Status,

    /// When the ticket was created.
    pub created_at: DateTime<Utc>,

    steps: Vec<Step>,

    #[serde(skip)]
    reached: ReachedAt,
}

impl Ticket {
    /// Create a ticket whose stages up to `status` were all reached at
    /// `created_at`.
    pub fn new(
        id: impl Into<String>,
        details: TicketDetails,
        status: Status,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::restore(id, details, status, created_at, ReachedAt::at(status, created_at))
    }

    /// Rebuild a ticket from a known timeline.
    ///
    /// The timeline is realigned to `status`; any reached stage without an
    /// instant is stamped with `created_at`.
    pub fn restore(
        id: impl Into<String>,
        details: TicketDetails,
        status: Status,
        created_at: DateTime<Utc>,
        mut reached: ReachedAt,
    ) -> Self {
        reached.advance(status, created_at);
        let steps = project(status, &reached);
        Self {
            id: id.into(),
            details,
            status,
            created_at,
            steps,
            reached,
        }
    }

    /// Current lifecycle status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Full progress timeline, in catalog order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The step matching the current status.
    pub fn current_step(&self) -> &Step {
        &self.steps[self.status.rank()]
    }

    /// Instants at which each stage was reached.
    pub fn reached_at(&self) -> &ReachedAt {
        &self.reached
    }

    /// Move to `status` at `at`, regenerating every step.
    ///
    /// Returns false (and changes nothing) if the ticket is already in
    /// `status`.
    pub fn transition(&mut self, status: Status, at: DateTime<Utc>) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.reached.advance(status, at);
        self.steps = project(status, &self.reached);
        true
    }
}

// ============================================================================
// Resolved tickets
// ============================================================================

/// Detail-stripped record of a closed ticket, kept for history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTicket {
    pub id: String,
    /// Display string, e.g. "Laptop - ThinkPad X1 Carbon".
    pub product: String,
    pub issue: String,
    pub resolution: String,
    pub resolved_by: String,
    pub resolved_date: NaiveDate,
}

impl ResolvedTicket {
    /// Project a ticket into its resolved record.
    pub fn from_ticket(
        ticket: &Ticket,
        resolution: impl Into<String>,
        resolved_by: impl Into<String>,
        resolved_date: NaiveDate,
    ) -> Self {
        Self {
            id: ticket.id.clone(),
            product: product_display(&ticket.details.product, &ticket.details.device_model),
            issue: ticket.details.issue.clone(),
            resolution: resolution.into(),
            resolved_by: resolved_by.into(),
            resolved_date,
        }
    }
}

/// "<Category> - <model>", with the category capitalised.
pub fn product_display(category: &str, model: &str) -> String {
    format!("{} - {}", capitalize(category), model)
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Standing of a purchase record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Active,
    Expired,
}

/// A component or device purchase, independent of the ticket lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order reference, e.g. "P-1001".
    pub id: String,
    pub product: String,
    pub order_date: NaiveDate,
    /// Service plan, e.g. "Gold".
    pub service_tier: String,
    pub status: OrderStatus,
}
