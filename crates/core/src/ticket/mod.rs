//! Repair tickets: status catalog, timeline projection and the store.

mod events;
mod memory_store;
pub mod seed;
mod status;
mod store;
pub mod timeline;
mod types;
mod validate;

pub use events::{EventBus, StoreEvent, DEFAULT_EVENT_CAPACITY};
pub use memory_store::{InMemoryTicketStore, StoreSettings, DEFAULT_ID_START};
pub use status::Status;
pub use store::{
    CreateTicketRequest, ReplaceSnapshot, ResolvePolicy, ResolveRequest, StoreError,
    StoreSnapshot, TicketFilter, TicketStore,
};
pub use timeline::{project, project_label, ReachedAt, Step};
pub use types::{product_display, Order, OrderStatus, ResolvedTicket, Ticket, TicketDetails};
pub use validate::{check_required, ContactValidator, DEFAULT_COUNTRY_CODES};
