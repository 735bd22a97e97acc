use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::ticket::{ResolvePolicy, StoreSettings, DEFAULT_COUNTRY_CODES, DEFAULT_ID_START};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Ticketing backend to mirror (sync disabled when absent)
    #[serde(default)]
    pub sync: Option<SyncConfig>,
}

impl Config {
    /// Settings for the in-memory ticket store.
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            resolve_policy: self.store.resolve_policy,
            id_start: self.store.id_start,
            country_codes: self.validation.country_codes.clone(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Ticket store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Load the demo tickets, resolved tickets and orders at startup
    #[serde(default = "default_seed_defaults")]
    pub seed_defaults: bool,
    /// What happens to an active ticket once resolved
    #[serde(default)]
    pub resolve_policy: ResolvePolicy,
    /// First numeric suffix for generated ticket ids
    #[serde(default = "default_id_start")]
    pub id_start: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_defaults: default_seed_defaults(),
            resolve_policy: ResolvePolicy::default(),
            id_start: default_id_start(),
        }
    }
}

fn default_seed_defaults() -> bool {
    true
}

fn default_id_start() -> u64 {
    DEFAULT_ID_START
}

/// Input validation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Country codes accepted in front of contact numbers (e.g. "+91")
    #[serde(default = "default_country_codes")]
    pub country_codes: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            country_codes: default_country_codes(),
        }
    }
}

fn default_country_codes() -> Vec<String> {
    DEFAULT_COUNTRY_CODES.iter().map(|c| c.to_string()).collect()
}

/// Ticketing backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Backend base URL (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Use the authenticated endpoints instead of the test ones
    #[serde(default)]
    pub authenticated: bool,
    /// Bearer token sent on authenticated requests
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Interval between background refreshes in seconds (default: 60)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_timeout() -> u32 {
    30
}

fn default_interval() -> u64 {
    60
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub validation: ValidationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SanitizedSyncConfig>,
}

/// Sanitized sync config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSyncConfig {
    pub base_url: String,
    pub authenticated: bool,
    pub token_configured: bool,
    pub timeout_secs: u32,
    pub interval_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            store: config.store.clone(),
            validation: config.validation.clone(),
            sync: config.sync.as_ref().map(|s| SanitizedSyncConfig {
                base_url: s.base_url.clone(),
                authenticated: s.authenticated,
                token_configured: s.token.as_deref().is_some_and(|t| !t.is_empty()),
                timeout_secs: s.timeout_secs,
                interval_secs: s.interval_secs,
            }),
        }
    }
}
