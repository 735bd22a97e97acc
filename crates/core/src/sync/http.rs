//! HTTP client for the ticketing backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Backend, BackendOrder, BackendTicket, NewBackendOrder, NewBackendTicket, SyncError};
use crate::config::SyncConfig;
use crate::metrics;

/// Test endpoints need no token; authenticated ones send a bearer token.
#[derive(Debug, Clone, Copy)]
struct Endpoints {
    list_tickets: &'static str,
    create_ticket: &'static str,
    list_orders: &'static str,
    create_order: &'static str,
    chat: &'static str,
}

const TEST_ENDPOINTS: Endpoints = Endpoints {
    list_tickets: "/api/tickets/test_tickets",
    create_ticket: "/api/tickets/test_create",
    list_orders: "/api/orders/test_orders",
    create_order: "/api/orders/test_create",
    chat: "/api/ai/chat_test",
};

const AUTH_ENDPOINTS: Endpoints = Endpoints {
    list_tickets: "/api/tickets/get_all_ticket",
    create_ticket: "/api/tickets/create",
    list_orders: "/api/orders/get_all_orders",
    create_order: "/api/orders/create",
    chat: "/api/ai/chat",
};

#[derive(Deserialize)]
struct TicketEnvelope {
    ticket: BackendTicket,
}

#[derive(Deserialize)]
struct OrderEnvelope {
    order: BackendOrder,
}

#[derive(Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

#[derive(Serialize)]
struct ChatQuery<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`Backend`] implementation over the backend's JSON HTTP API.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
    endpoints: Endpoints,
}

impl HttpBackend {
    /// Create a new HttpBackend with the given configuration.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| SyncError::ConnectionFailed(format!("Failed to create HTTP client: {}", e)))?;

        let endpoints = if config.authenticated {
            AUTH_ENDPOINTS
        } else {
            TEST_ENDPOINTS
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config
                .token
                .clone()
                .filter(|_| config.authenticated),
            endpoints,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn status_path(collection: &str, id: &str) -> String {
        format!("/api/{}/{}/status", collection, urlencoding::encode(id))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode the JSON body, recording metrics under
    /// `endpoint`.
    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<T, SyncError> {
        let start = Instant::now();
        let result = self.send_inner(builder).await;

        metrics::BACKEND_REQUEST_DURATION
            .with_label_values(&[endpoint])
            .observe(start.elapsed().as_secs_f64());
        metrics::BACKEND_REQUESTS
            .with_label_values(&[endpoint, if result.is_ok() { "success" } else { "failure" }])
            .inc();

        result
    }

    async fn send_inner<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, SyncError> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))
    }
}

fn map_transport_error(e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        SyncError::Timeout
    } else if e.is_connect() {
        SyncError::ConnectionFailed(e.to_string())
    } else {
        SyncError::Api {
            status: e.status().map(|s| s.as_u16()).unwrap_or_default(),
            message: e.to_string(),
        }
    }
}

async fn check_status(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    Err(SyncError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_tickets(&self) -> Result<Vec<BackendTicket>, SyncError> {
        debug!(url = %self.url(self.endpoints.list_tickets), "Fetching tickets");
        self.send(
            "list_tickets",
            self.request(Method::GET, self.endpoints.list_tickets),
        )
        .await
    }

    async fn create_ticket(&self, ticket: &NewBackendTicket) -> Result<BackendTicket, SyncError> {
        let envelope: TicketEnvelope = self
            .send(
                "create_ticket",
                self.request(Method::POST, self.endpoints.create_ticket)
                    .json(ticket),
            )
            .await?;
        Ok(envelope.ticket)
    }

    async fn update_ticket_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<BackendTicket, SyncError> {
        let envelope: TicketEnvelope = self
            .send(
                "update_ticket_status",
                self.request(Method::PUT, &Self::status_path("tickets", id))
                    .json(&StatusUpdate { status }),
            )
            .await?;
        Ok(envelope.ticket)
    }

    async fn fetch_orders(&self) -> Result<Vec<BackendOrder>, SyncError> {
        debug!(url = %self.url(self.endpoints.list_orders), "Fetching orders");
        self.send(
            "list_orders",
            self.request(Method::GET, self.endpoints.list_orders),
        )
        .await
    }

    async fn create_order(&self, order: &NewBackendOrder) -> Result<BackendOrder, SyncError> {
        let envelope: OrderEnvelope = self
            .send(
                "create_order",
                self.request(Method::POST, self.endpoints.create_order)
                    .json(order),
            )
            .await?;
        Ok(envelope.order)
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<BackendOrder, SyncError> {
        let envelope: OrderEnvelope = self
            .send(
                "update_order_status",
                self.request(Method::PUT, &Self::status_path("orders", id))
                    .json(&StatusUpdate { status }),
            )
            .await?;
        Ok(envelope.order)
    }

    async fn chat(&self, query: &str) -> Result<String, SyncError> {
        let reply: ChatResponse = self
            .send(
                "chat",
                self.request(Method::POST, self.endpoints.chat)
                    .json(&ChatQuery { query }),
            )
            .await?;
        Ok(reply.response.unwrap_or_default())
    }
}
