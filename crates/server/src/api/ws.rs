//! WebSocket feed of store changes for live dashboards.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use repairdesk_core::StoreEvent;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Interval between heartbeats on an idle connection.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Message sent to WebSocket clients.
///
/// Store events keep their own `type` tag (`ticket_created`,
/// `status_changed`, ...); heartbeats use `heartbeat`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WsMessage {
    Store(StoreEvent),
    Heartbeat(Heartbeat),
}

#[derive(Debug, Clone, Serialize)]
pub struct Heartbeat {
    #[serde(rename = "type")]
    kind: &'static str,
    pub timestamp: i64,
}

impl WsMessage {
    pub fn heartbeat() -> Self {
        WsMessage::Heartbeat(Heartbeat {
            kind: "heartbeat",
            timestamp: Utc::now().timestamp(),
        })
    }

    /// Message type for metrics labels.
    pub fn message_type(&self) -> &'static str {
        match self {
            WsMessage::Store(event) => event.event_type(),
            WsMessage::Heartbeat(_) => "heartbeat",
        }
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut rx = state.store().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first tick completes immediately.
        heartbeat.tick().await;

        loop {
            let msg = tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(event) => WsMessage::Store(event),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("WebSocket client lagged, skipped {} events", n);
                            WS_LAG_EVENTS.inc();
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("Store event channel closed");
                            break;
                        }
                    }
                }
                _ = heartbeat.tick() => WsMessage::heartbeat(),
            };

            WS_MESSAGES_SENT
                .with_label_values(&[msg.message_type()])
                .inc();

            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize WsMessage: {}", e);
                }
            }
        }
    });

    // Clients only listen; drain until close.
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Ignoring client message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use repairdesk_core::Status;

    #[test]
    fn test_store_event_keeps_its_tag() {
        let msg = WsMessage::Store(StoreEvent::StatusChanged {
            ticket_id: "TKT-1234".to_string(),
            from: Status::Picked,
            to: Status::InService,
        });
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["ticketId"], "TKT-1234");
        assert_eq!(json["to"], "In Service");
        assert_eq!(msg.message_type(), "status_changed");
    }

    #[test]
    fn test_heartbeat_shape() {
        let json: serde_json::Value = serde_json::to_value(WsMessage::heartbeat()).unwrap();
        assert_eq!(json["type"], "heartbeat");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }
}
