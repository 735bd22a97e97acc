pub mod chat;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod orders;
pub mod resolved;
pub mod routes;
pub mod stats;
pub mod sync;
pub mod tickets;
pub mod ws;

pub use routes::create_router;
pub use ws::WsMessage;
