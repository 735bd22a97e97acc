use std::sync::Arc;
use std::time::Duration;

use repairdesk_core::ticket::ContactValidator;
use repairdesk_core::{Backend, Config, SanitizedConfig, SyncService, TicketStore};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn TicketStore>,
    backend: Option<Arc<dyn Backend>>,
    sync: Option<Arc<SyncService>>,
}

impl AppState {
    /// State backed by the local store only.
    pub fn new(config: Config, store: Arc<dyn TicketStore>) -> Self {
        Self {
            config,
            store,
            backend: None,
            sync: None,
        }
    }

    /// Attach a ticketing backend. Write operations then go through a
    /// [`SyncService`] built from the `[sync]` and `[validation]` sections.
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        let mut sync = SyncService::new(Arc::clone(&self.store), Arc::clone(&backend))
            .with_validator(ContactValidator::new(
                self.config.validation.country_codes.iter(),
            ));
        if let Some(sync_config) = &self.config.sync {
            sync = sync.with_interval(Duration::from_secs(sync_config.interval_secs));
        }

        self.backend = Some(backend);
        self.sync = Some(Arc::new(sync));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &dyn TicketStore {
        self.store.as_ref()
    }

    pub fn backend(&self) -> Option<&dyn Backend> {
        self.backend.as_deref()
    }

    pub fn sync(&self) -> Option<&Arc<SyncService>> {
        self.sync.as_ref()
    }
}
