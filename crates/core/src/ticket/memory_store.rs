//! In-memory ticket store.
//!
//! All three collections live behind a single lock so that every operation
//! (and the step derivation it triggers) is applied atomically.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::validate::{check_required, ContactValidator, DEFAULT_COUNTRY_CODES};
use super::{
    CreateTicketRequest, EventBus, Order, ReplaceSnapshot, ResolvePolicy, ResolveRequest,
    ResolvedTicket, Status, StoreError, StoreEvent, StoreSnapshot, Ticket, TicketFilter,
    TicketStore,
};
use crate::metrics;

/// First numeric suffix handed out by the id generator.
pub const DEFAULT_ID_START: u64 = 1000;

/// Behaviour knobs for [`InMemoryTicketStore`].
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub resolve_policy: ResolvePolicy,
    /// First numeric suffix for generated ids.
    pub id_start: u64,
    /// Country codes accepted in front of contact numbers.
    pub country_codes: Vec<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            resolve_policy: ResolvePolicy::default(),
            id_start: DEFAULT_ID_START,
            country_codes: DEFAULT_COUNTRY_CODES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

struct StoreState {
    tickets: Vec<Ticket>,
    resolved: Vec<ResolvedTicket>,
    orders: Vec<Order>,
    next_id: u64,
}

impl StoreState {
    fn is_taken(&self, id: &str) -> bool {
        self.tickets.iter().any(|t| t.id == id) || self.resolved.iter().any(|r| r.id == id)
    }

    /// Next `TKT-<n>` not used by any active or resolved ticket.
    fn allocate_id(&mut self) -> String {
        loop {
            let candidate = format!("TKT-{:04}", self.next_id);
            self.next_id += 1;
            if !self.is_taken(&candidate) {
                return candidate;
            }
        }
    }

    fn ticket_index(&self, id: &str) -> Result<usize, StoreError> {
        self.tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// Ticket store holding tickets, resolved tickets and orders in memory.
pub struct InMemoryTicketStore {
    state: RwLock<StoreState>,
    settings: StoreSettings,
    validator: ContactValidator,
    events: EventBus,
}

impl InMemoryTicketStore {
    /// Create an empty store.
    pub fn new(settings: StoreSettings) -> Self {
        Self::with_data(settings, StoreSnapshot::default())
    }

    /// Create a store pre-populated with `data`.
    pub fn with_data(settings: StoreSettings, data: StoreSnapshot) -> Self {
        let validator = ContactValidator::new(settings.country_codes.iter().cloned());
        let state = StoreState {
            tickets: data.tickets,
            resolved: data.resolved_tickets,
            orders: data.orders,
            next_id: settings.id_start,
        };

        Self {
            state: RwLock::new(state),
            settings,
            validator,
            events: EventBus::default(),
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }
}

impl TicketStore for InMemoryTicketStore {
    fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, StoreError> {
        check_required(&request.details)?;
        self.validator.check(&request.details.contact_number)?;

        let status = request.status.unwrap_or_default();
        let mut state = self.write()?;
        let id = state.allocate_id();
        let ticket = Ticket::new(id, request.details, status, Utc::now());
        state.tickets.insert(0, ticket.clone());
        self.events.publish(StoreEvent::TicketCreated {
            ticket_id: ticket.id.clone(),
            status,
        });
        drop(state);

        info!(ticket_id = %ticket.id, status = %status, "Ticket created");
        metrics::TICKETS_CREATED.inc();
        Ok(ticket)
    }

    fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, StoreError> {
        let state = self.read()?;
        Ok(state.tickets.iter().find(|t| t.id == id).cloned())
    }

    fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, StoreError> {
        let state = self.read()?;
        Ok(state
            .tickets
            .iter()
            .filter(|t| filter.matches(t))
            .skip(filter.offset)
            .take(filter.limit)
            .cloned()
            .collect())
    }

    fn count_tickets(&self, filter: &TicketFilter) -> Result<usize, StoreError> {
        let state = self.read()?;
        Ok(state.tickets.iter().filter(|t| filter.matches(t)).count())
    }

    fn set_status(&self, id: &str, status: Status) -> Result<Ticket, StoreError> {
        let mut state = self.write()?;
        let idx = state.ticket_index(id)?;
        let ticket = &mut state.tickets[idx];
        let from = ticket.status();
        if !ticket.transition(status, Utc::now()) {
            debug!(ticket_id = %id, status = %status, "Status unchanged");
            return Ok(ticket.clone());
        }

        let ticket = ticket.clone();
        self.events.publish(StoreEvent::StatusChanged {
            ticket_id: id.to_string(),
            from,
            to: status,
        });
        drop(state);

        info!(ticket_id = %id, from = %from, to = %status, "Ticket status changed");
        metrics::STATUS_TRANSITIONS
            .with_label_values(&[from.label(), status.label()])
            .inc();
        Ok(ticket)
    }

    fn resolve_ticket(
        &self,
        id: &str,
        request: ResolveRequest,
    ) -> Result<ResolvedTicket, StoreError> {
        let policy = self.settings.resolve_policy;
        let archived = policy == ResolvePolicy::Archive;

        let mut state = self.write()?;
        let idx = state.ticket_index(id)?;
        if state.resolved.iter().any(|r| r.id == id) {
            return Err(StoreError::AlreadyResolved(id.to_string()));
        }

        let ticket = &mut state.tickets[idx];
        ticket.transition(Status::Delivered, Utc::now());
        let resolved = ResolvedTicket::from_ticket(
            ticket,
            request.resolution,
            request.resolved_by,
            request
                .resolved_date
                .unwrap_or_else(|| Utc::now().date_naive()),
        );

        state.resolved.insert(0, resolved.clone());
        if archived {
            state.tickets.remove(idx);
        }
        self.events.publish(StoreEvent::TicketResolved {
            ticket_id: id.to_string(),
            resolved_by: resolved.resolved_by.clone(),
            archived,
        });
        drop(state);

        info!(
            ticket_id = %id,
            resolved_by = %resolved.resolved_by,
            archived,
            "Ticket resolved"
        );
        metrics::TICKETS_RESOLVED
            .with_label_values(&[if archived { "archive" } else { "retain" }])
            .inc();
        Ok(resolved)
    }

    fn upsert_ticket(&self, ticket: Ticket) -> Result<(), StoreError> {
        let ticket_id = ticket.id.clone();
        let status = ticket.status();

        let mut state = self.write()?;
        match state.tickets.iter().position(|t| t.id == ticket_id) {
            Some(idx) => {
                state.tickets[idx] = ticket;
                self.events
                    .publish(StoreEvent::TicketUpdated { ticket_id, status });
            }
            None => {
                state.tickets.insert(0, ticket);
                self.events
                    .publish(StoreEvent::TicketCreated { ticket_id, status });
            }
        }
        Ok(())
    }

    fn delete_ticket(&self, id: &str) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let before = state.tickets.len();
        state.tickets.retain(|t| t.id != id);
        let removed = state.tickets.len() != before;

        if removed {
            self.events.publish(StoreEvent::TicketDeleted {
                ticket_id: id.to_string(),
            });
            info!(ticket_id = %id, "Ticket deleted");
        }
        Ok(removed)
    }

    fn resolved_tickets(&self) -> Result<Vec<ResolvedTicket>, StoreError> {
        Ok(self.read()?.resolved.clone())
    }

    fn add_resolved_ticket(&self, resolved: ResolvedTicket) -> Result<(), StoreError> {
        let ticket_id = resolved.id.clone();
        let mut state = self.write()?;
        if state.resolved.iter().any(|r| r.id == ticket_id) {
            return Err(StoreError::AlreadyResolved(ticket_id));
        }
        state.resolved.insert(0, resolved);
        self.events
            .publish(StoreEvent::ResolvedTicketAdded { ticket_id });
        Ok(())
    }

    fn remove_resolved_ticket(&self, id: &str) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let before = state.resolved.len();
        state.resolved.retain(|r| r.id != id);
        let removed = state.resolved.len() != before;

        if removed {
            self.events.publish(StoreEvent::ResolvedTicketRemoved {
                ticket_id: id.to_string(),
            });
        }
        Ok(removed)
    }

    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.read()?.orders.clone())
    }

    fn add_order(&self, order: Order) -> Result<(), StoreError> {
        let order_id = order.id.clone();
        let mut state = self.write()?;
        state.orders.insert(0, order);
        self.events.publish(StoreEvent::OrderAdded {
            order_id: order_id.clone(),
        });
        drop(state);

        debug!(order_id = %order_id, "Order added");
        Ok(())
    }

    fn upsert_order(&self, order: Order) -> Result<(), StoreError> {
        let order_id = order.id.clone();
        let mut state = self.write()?;
        match state.orders.iter().position(|o| o.id == order_id) {
            Some(idx) => {
                state.orders[idx] = order;
                self.events.publish(StoreEvent::OrderUpdated { order_id });
            }
            None => {
                state.orders.insert(0, order);
                self.events.publish(StoreEvent::OrderAdded { order_id });
            }
        }
        Ok(())
    }

    fn remove_order(&self, id: &str) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let before = state.orders.len();
        state.orders.retain(|o| o.id != id);
        let removed = state.orders.len() != before;

        if removed {
            self.events.publish(StoreEvent::OrderRemoved {
                order_id: id.to_string(),
            });
        }
        Ok(removed)
    }

    fn replace_all(&self, snapshot: ReplaceSnapshot) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let tickets = snapshot.tickets.map(|tickets| {
            state.tickets = tickets;
            state.tickets.len()
        });
        let resolved_tickets = snapshot.resolved_tickets.map(|resolved| {
            state.resolved = resolved;
            state.resolved.len()
        });
        let orders = snapshot.orders.map(|orders| {
            state.orders = orders;
            state.orders.len()
        });
        let event = StoreEvent::Replaced {
            tickets,
            resolved_tickets,
            orders,
        };

        info!(?event, "Store contents replaced");
        self.events.publish(event);
        Ok(())
    }

    fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let state = self.read()?;
        Ok(StoreSnapshot {
            tickets: state.tickets.clone(),
            resolved_tickets: state.resolved.clone(),
            orders: state.orders.clone(),
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::{OrderStatus, TicketDetails};
    use chrono::NaiveDate;

    fn details() -> TicketDetails {
        TicketDetails {
            product: "laptop".to_string(),
            device_model: "ThinkPad X1 Carbon".to_string(),
            issue: "Screen flickering intermittently".to_string(),
            pickup_date: "2025-10-25".to_string(),
            time_slot: "10:00 AM - 12:00 PM".to_string(),
            address: "123 Main Street, Apt 4B".to_string(),
            contact_number: "9876543210".to_string(),
            notes: "Please call before pickup".to_string(),
        }
    }

    fn order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            product: "Mobile - Battery".to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
            service_tier: "Gold".to_string(),
            status: OrderStatus::Active,
        }
    }

    fn store() -> InMemoryTicketStore {
        InMemoryTicketStore::new(StoreSettings::default())
    }

    #[test]
    fn test_create_ticket_defaults() {
        let store = store();
        let ticket = store
            .create_ticket(CreateTicketRequest::new(details()))
            .unwrap();

        assert_eq!(ticket.id, "TKT-1000");
        assert_eq!(ticket.status(), Status::NotPicked);
        assert!(ticket.steps()[0].current);
        assert_eq!(store.get_ticket(&ticket.id).unwrap(), Some(ticket));
    }

    #[test]
    fn test_create_ticket_with_initial_status() {
        let store = store();
        let ticket = store
            .create_ticket(CreateTicketRequest::new(details()).with_status(Status::Picked))
            .unwrap();
        assert_eq!(ticket.status(), Status::Picked);
        assert!(ticket.steps()[0].completed);
        assert!(ticket.steps()[1].current);
    }

    #[test]
    fn test_new_tickets_go_to_front() {
        let store = store();
        let first = store.create_ticket(CreateTicketRequest::new(details())).unwrap();
        let second = store.create_ticket(CreateTicketRequest::new(details())).unwrap();

        let listed = store.list_tickets(&TicketFilter::new()).unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn test_create_missing_issue_leaves_store_unchanged() {
        let store = store();
        let mut d = details();
        d.issue = String::new();

        let err = store.create_ticket(CreateTicketRequest::new(d)).unwrap_err();
        assert!(matches!(err, StoreError::Validation { ref fields } if fields == &["issue"]));
        assert_eq!(store.count_tickets(&TicketFilter::new()).unwrap(), 0);
    }

    #[test]
    fn test_create_invalid_contact() {
        let store = store();
        let mut d = details();
        d.contact_number = "123".to_string();

        let err = store.create_ticket(CreateTicketRequest::new(d)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidContact(_)));
        assert_eq!(store.count_tickets(&TicketFilter::new()).unwrap(), 0);
    }

    #[test]
    fn test_generated_ids_skip_existing() {
        let existing = Ticket::new("TKT-1000", details(), Status::Picked, Utc::now());
        let resolved = ResolvedTicket {
            id: "TKT-1001".to_string(),
            product: "TV - OLED".to_string(),
            issue: "No picture".to_string(),
            resolution: "Panel replaced".to_string(),
            resolved_by: "Emily K.".to_string(),
            resolved_date: NaiveDate::from_ymd_opt(2025, 7, 22).unwrap(),
        };
        let store = InMemoryTicketStore::with_data(
            StoreSettings::default(),
            StoreSnapshot {
                tickets: vec![existing],
                resolved_tickets: vec![resolved],
                orders: vec![],
            },
        );

        let ticket = store.create_ticket(CreateTicketRequest::new(details())).unwrap();
        assert_eq!(ticket.id, "TKT-1002");
    }

    #[test]
    fn test_set_status_regenerates_steps() {
        let store = store();
        let ticket = store.create_ticket(CreateTicketRequest::new(details())).unwrap();

        let updated = store.set_status(&ticket.id, Status::InService).unwrap();
        assert!(updated.steps()[2].current);
        assert!(updated.steps()[0].completed);
        assert!(updated.steps()[1].completed);
        assert!(!updated.steps()[2].completed);
        assert!(updated.reached_at().is_consistent_with(Status::InService));

        let stored = store.get_ticket(&ticket.id).unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn test_set_status_unknown_id() {
        let err = store().set_status("TKT-9999", Status::Picked).unwrap_err();
        assert_eq!(err, StoreError::NotFound("TKT-9999".to_string()));
    }

    #[test]
    fn test_set_status_backwards_is_allowed() {
        let store = store();
        let ticket = store
            .create_ticket(CreateTicketRequest::new(details()).with_status(Status::Repaired))
            .unwrap();

        let updated = store.set_status(&ticket.id, Status::Picked).unwrap();
        assert_eq!(updated.status(), Status::Picked);
        assert!(updated.steps()[3].timestamp.is_none());
        assert!(!updated.steps()[3].completed);
    }

    #[test]
    fn test_resolve_retains_ticket_by_default() {
        let store = store();
        let ticket = store.create_ticket(CreateTicketRequest::new(details())).unwrap();
        store.add_order(order("P-1001")).unwrap();

        let resolved = store
            .resolve_ticket(&ticket.id, ResolveRequest::new("Fixed", "Agent A"))
            .unwrap();
        assert_eq!(resolved.id, ticket.id);
        assert_eq!(resolved.resolved_date, Utc::now().date_naive());

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.resolved_tickets.len(), 1);
        assert_eq!(snapshot.orders.len(), 1);
        assert_eq!(snapshot.tickets.len(), 1);
        assert_eq!(snapshot.tickets[0].status(), Status::Delivered);
    }

    #[test]
    fn test_resolve_archive_removes_ticket() {
        let store = InMemoryTicketStore::new(StoreSettings {
            resolve_policy: ResolvePolicy::Archive,
            ..Default::default()
        });
        let ticket = store.create_ticket(CreateTicketRequest::new(details())).unwrap();

        store
            .resolve_ticket(&ticket.id, ResolveRequest::new("Fixed", "Agent A"))
            .unwrap();

        assert!(store.get_ticket(&ticket.id).unwrap().is_none());
        assert_eq!(store.resolved_tickets().unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_twice_fails() {
        let store = store();
        let ticket = store.create_ticket(CreateTicketRequest::new(details())).unwrap();
        store
            .resolve_ticket(&ticket.id, ResolveRequest::new("Fixed", "Agent A"))
            .unwrap();

        let err = store
            .resolve_ticket(&ticket.id, ResolveRequest::new("Again", "Agent B"))
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyResolved(_)));
        assert_eq!(store.resolved_tickets().unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_with_explicit_date() {
        let store = store();
        let ticket = store.create_ticket(CreateTicketRequest::new(details())).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();

        let resolved = store
            .resolve_ticket(&ticket.id, ResolveRequest::new("Fixed", "Mike R.").on(date))
            .unwrap();
        assert_eq!(resolved.resolved_date, date);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = store();
        let ticket = store.create_ticket(CreateTicketRequest::new(details())).unwrap();
        let before = store.snapshot().unwrap();

        assert!(!store.delete_ticket("does-not-exist").unwrap());
        assert_eq!(store.snapshot().unwrap(), before);

        assert!(store.delete_ticket(&ticket.id).unwrap());
        assert!(!store.delete_ticket(&ticket.id).unwrap());
    }

    #[test]
    fn test_orders_insert_and_remove() {
        let store = store();
        store.add_order(order("P-1")).unwrap();
        store.add_order(order("P-2")).unwrap();

        let ids: Vec<_> = store.orders().unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["P-2", "P-1"]);

        assert!(store.remove_order("P-1").unwrap());
        assert!(!store.remove_order("P-1").unwrap());
        assert_eq!(store.orders().unwrap().len(), 1);
    }

    #[test]
    fn test_replace_all_does_not_merge() {
        let store = store();
        let a = Ticket::new("1", details(), Status::Picked, Utc::now());
        let b = Ticket::new("2", details(), Status::Repaired, Utc::now());

        store
            .replace_all(ReplaceSnapshot::new().with_tickets(vec![a]))
            .unwrap();
        store
            .replace_all(ReplaceSnapshot::new().with_tickets(vec![b.clone()]))
            .unwrap();

        let tickets = store.list_tickets(&TicketFilter::new()).unwrap();
        assert_eq!(tickets, vec![b]);
    }

    #[test]
    fn test_replace_all_keeps_absent_collections() {
        let store = store();
        store.add_order(order("P-1")).unwrap();

        store
            .replace_all(ReplaceSnapshot::new().with_tickets(vec![]))
            .unwrap();
        assert_eq!(store.orders().unwrap().len(), 1);

        store
            .replace_all(ReplaceSnapshot::new().with_orders(vec![]))
            .unwrap();
        assert!(store.orders().unwrap().is_empty());
    }

    #[test]
    fn test_list_filter_and_pagination() {
        let store = store();
        for _ in 0..3 {
            store.create_ticket(CreateTicketRequest::new(details())).unwrap();
        }
        let picked = store
            .create_ticket(CreateTicketRequest::new(details()).with_status(Status::Picked))
            .unwrap();

        let filter = TicketFilter::new().with_status(Status::Picked);
        assert_eq!(store.list_tickets(&filter).unwrap(), vec![picked]);
        assert_eq!(store.count_tickets(&filter).unwrap(), 1);

        let page = TicketFilter::new().with_limit(2).with_offset(1);
        assert_eq!(store.list_tickets(&page).unwrap().len(), 2);
        assert_eq!(store.count_tickets(&page).unwrap(), 4);
    }

    #[test]
    fn test_resolved_records_add_and_remove() {
        let store = store();
        let record = ResolvedTicket {
            id: "TKT-1150".to_string(),
            product: "Laptop - Standard".to_string(),
            issue: "Battery draining fast".to_string(),
            resolution: "Battery replaced".to_string(),
            resolved_by: "Mike R.".to_string(),
            resolved_date: NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(),
        };

        store.add_resolved_ticket(record.clone()).unwrap();
        assert!(matches!(
            store.add_resolved_ticket(record),
            Err(StoreError::AlreadyResolved(_))
        ));
        assert!(store.remove_resolved_ticket("TKT-1150").unwrap());
        assert!(store.resolved_tickets().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_events_emitted_per_operation() {
        let store = store();
        let mut rx = store.subscribe();

        let ticket = store.create_ticket(CreateTicketRequest::new(details())).unwrap();
        store.set_status(&ticket.id, Status::Picked).unwrap();
        // Same status again: no event.
        store.set_status(&ticket.id, Status::Picked).unwrap();
        store.delete_ticket(&ticket.id).unwrap();

        assert!(matches!(rx.recv().await.unwrap(), StoreEvent::TicketCreated { .. }));
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::StatusChanged {
                ticket_id: ticket.id.clone(),
                from: Status::NotPicked,
                to: Status::Picked,
            }
        );
        assert!(matches!(rx.recv().await.unwrap(), StoreEvent::TicketDeleted { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_failed_operations_emit_nothing() {
        let store = store();
        let mut rx = store.subscribe();

        let _ = store.set_status("missing", Status::Picked);
        let _ = store.delete_ticket("missing");
        let _ = store.create_ticket(CreateTicketRequest::new(TicketDetails::default()));

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_concurrent_transitions_publish_in_commit_order() {
        let store = std::sync::Arc::new(store());
        let id = store
            .create_ticket(CreateTicketRequest::new(details()))
            .unwrap()
            .id;
        let mut rx = store.subscribe();

        let handles: Vec<_> = [Status::InService, Status::Repaired]
            .into_iter()
            .map(|target| {
                let store = std::sync::Arc::clone(&store);
                let id = id.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.set_status(&id, target).unwrap();
                        store.set_status(&id, Status::Picked).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Each event starts where the previous one ended.
        let mut current = Status::NotPicked;
        while let Ok(event) = rx.try_recv() {
            match event {
                StoreEvent::StatusChanged { from, to, .. } => {
                    assert_eq!(from, current);
                    current = to;
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        let stored = store.get_ticket(&id).unwrap().unwrap().status();
        assert_eq!(current, stored);
    }

    #[test]
    fn test_upsert_ticket_replaces_in_place_or_inserts() {
        let store = store();
        let first = store.create_ticket(CreateTicketRequest::new(details())).unwrap();
        store.create_ticket(CreateTicketRequest::new(details())).unwrap();
        let mut rx = store.subscribe();

        let replacement = Ticket::new(first.id.clone(), details(), Status::Repaired, Utc::now());
        store.upsert_ticket(replacement).unwrap();
        let tickets = store.list_tickets(&TicketFilter::new()).unwrap();
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[1].id, first.id);
        assert_eq!(tickets[1].status(), Status::Repaired);

        store
            .upsert_ticket(Ticket::new("42", details(), Status::Picked, Utc::now()))
            .unwrap();
        assert_eq!(store.list_tickets(&TicketFilter::new()).unwrap()[0].id, "42");

        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::TicketUpdated {
                ticket_id: first.id.clone(),
                status: Status::Repaired,
            }
        );
        assert!(matches!(rx.try_recv().unwrap(), StoreEvent::TicketCreated { .. }));
    }

    #[test]
    fn test_upsert_order_replaces_in_place_or_inserts() {
        let store = store();
        store.add_order(order("P-1")).unwrap();
        store.add_order(order("P-2")).unwrap();

        let mut expired = order("P-1");
        expired.status = OrderStatus::Expired;
        store.upsert_order(expired).unwrap();
        store.upsert_order(order("P-3")).unwrap();

        let orders = store.orders().unwrap();
        let ids: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["P-3", "P-2", "P-1"]);
        assert_eq!(orders[2].status, OrderStatus::Expired);
    }
}
