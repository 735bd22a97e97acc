//! Mirroring of the remote ticketing backend into the local store.

mod http;
mod service;
pub mod translate;
mod types;

pub use http::HttpBackend;
pub use service::{SyncReport, SyncService, SyncStatus, SyncSummary, DEFAULT_SYNC_INTERVAL};
pub use types::{
    Backend, BackendOrder, BackendProduct, BackendTicket, NewBackendOrder, NewBackendTicket,
    RecordId, SyncError,
};
