//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with an in-memory store and, optionally, a mock ticketing backend.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use repairdesk_core::testing::MockBackend;
use repairdesk_core::ticket::seed::default_snapshot;
use repairdesk_core::{
    Backend, Config, InMemoryTicketStore, ResolvePolicy, StoreSnapshot, SyncConfig, TicketStore,
};
use repairdesk_server::state::AppState;

/// Re-export fixtures for test convenience
pub use repairdesk_core::testing::fixtures;

/// Test fixture for E2E testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ticket_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/tickets", fixtures_body()).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The store behind the router
    pub store: Arc<InMemoryTicketStore>,
    /// Mock backend; only wired into the router with `TestConfig::with_backend`
    pub backend: Arc<MockBackend>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Seeded store, retain policy, no backend.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let mut config = Config::default();
        config.store.resolve_policy = test_config.resolve_policy;
        config.store.seed_defaults = test_config.seed;
        if test_config.with_backend {
            config.sync = Some(SyncConfig {
                base_url: "http://backend.test".to_string(),
                authenticated: false,
                token: None,
                timeout_secs: 5,
                interval_secs: 3600,
            });
        }

        let snapshot = if test_config.seed {
            default_snapshot()
        } else {
            StoreSnapshot::default()
        };
        let store = Arc::new(InMemoryTicketStore::with_data(
            config.store_settings(),
            snapshot,
        ));
        let backend = Arc::new(MockBackend::new());

        let mut state = AppState::new(config, Arc::clone(&store) as Arc<dyn TicketStore>);
        if test_config.with_backend {
            state = state.with_backend(Arc::clone(&backend) as Arc<dyn Backend>);
        }

        let router = repairdesk_server::api::create_router(Arc::new(state));

        Self {
            router,
            store,
            backend,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let (status, bytes) = self.send(request).await;
        TestResponse {
            status,
            body: parse_body(&bytes),
        }
    }

    /// Send a GET request and return the body as text (for non-JSON endpoints).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        let (status, bytes) = self.send(request).await;

        TestResponse {
            status,
            body: parse_body(&bytes),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, body_bytes.to_vec())
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap_or(Value::Null)
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Load the demo tickets, resolved records and orders
    pub seed: bool,
    pub resolve_policy: ResolvePolicy,
    /// Route writes through the mock backend
    pub with_backend: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            seed: true,
            resolve_policy: ResolvePolicy::Retain,
            with_backend: false,
        }
    }
}

impl TestConfig {
    /// Empty store.
    pub fn empty() -> Self {
        Self {
            seed: false,
            ..Self::default()
        }
    }

    /// Resolved tickets leave the active list.
    pub fn archive() -> Self {
        Self {
            resolve_policy: ResolvePolicy::Archive,
            ..Self::default()
        }
    }

    /// Empty store mirrored from the mock backend.
    pub fn with_backend() -> Self {
        Self {
            seed: false,
            with_backend: true,
            ..Self::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
