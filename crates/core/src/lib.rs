pub mod chat;
pub mod config;
pub mod metrics;
pub mod stats;
pub mod sync;
pub mod testing;
pub mod ticket;

pub use chat::{ask, ChatReply, ChatRequest, FALLBACK_REPLY};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    SyncConfig,
};
pub use stats::{agent_performance, AgentPerformance, AgentSort, DashboardStats, StatusCount};
pub use sync::{Backend, HttpBackend, SyncError, SyncService, SyncStatus, SyncSummary};
pub use ticket::{
    CreateTicketRequest, InMemoryTicketStore, Order, OrderStatus, ReplaceSnapshot, ResolvePolicy,
    ResolveRequest, ResolvedTicket, Status, Step, StoreError, StoreEvent, StoreSettings,
    StoreSnapshot, Ticket, TicketDetails, TicketFilter, TicketStore,
};
