use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repairdesk_core::ticket::seed::default_snapshot;
use repairdesk_core::{
    load_config, validate_config, Backend, HttpBackend, InMemoryTicketStore, TicketStore,
};
use repairdesk_server::api::create_router;
use repairdesk_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("REPAIRDESK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        resolve_policy = ?config.store.resolve_policy,
        "Configuration loaded successfully"
    );

    // Create ticket store
    let settings = config.store_settings();
    let store: Arc<dyn TicketStore> = if config.store.seed_defaults {
        info!("Seeding store with demo data");
        Arc::new(InMemoryTicketStore::with_data(settings, default_snapshot()))
    } else {
        Arc::new(InMemoryTicketStore::new(settings))
    };
    info!("Ticket store initialized");

    // Create backend and sync service if configured
    let mut state = AppState::new(config.clone(), Arc::clone(&store));
    if let Some(sync_config) = &config.sync {
        info!(
            "Initializing backend sync with {} (authenticated: {})",
            sync_config.base_url, sync_config.authenticated
        );
        let backend: Arc<dyn Backend> = Arc::new(
            HttpBackend::new(sync_config).context("Failed to create backend client")?,
        );
        state = state.with_backend(backend);
    } else {
        info!("No backend configured, running on local data only");
    }
    let state = Arc::new(state);

    if let Some(sync) = state.sync() {
        sync.start();
    }

    // Create router
    let app = create_router(Arc::clone(&state));

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if let Some(sync) = state.sync() {
        if sync.is_running() {
            sync.stop();
            info!("Sync service stopped");
        }
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
