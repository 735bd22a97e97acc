use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{types::Config, ConfigError};

static COUNTRY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[0-9]{1,3}$").unwrap());

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Country codes look like "+<1-3 digits>"
/// - Sync section (when present) has a base URL, a non-zero interval and a
///   token if authenticated endpoints are used
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Validation section
    if let Some(code) = config
        .validation
        .country_codes
        .iter()
        .find(|code| !COUNTRY_CODE.is_match(code))
    {
        return Err(ConfigError::ValidationError(format!(
            "validation.country_codes contains malformed code '{}'",
            code
        )));
    }

    // Sync validation
    if let Some(sync) = &config.sync {
        if sync.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sync.base_url cannot be empty".to_string(),
            ));
        }
        if sync.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sync.interval_secs cannot be 0".to_string(),
            ));
        }
        if sync.authenticated && sync.token.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::ValidationError(
                "sync.token is required when sync.authenticated is true".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, SyncConfig, ValidationConfig};
    use std::net::IpAddr;

    fn sync_config() -> SyncConfig {
        SyncConfig {
            base_url: "http://localhost:8000".to_string(),
            authenticated: false,
            token: None,
            timeout_secs: 30,
            interval_secs: 60,
        }
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config {
            sync: Some(sync_config()),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_malformed_country_code_fails() {
        let config = Config {
            validation: ValidationConfig {
                country_codes: vec!["+91".to_string(), "91".to_string()],
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("'91'"));
    }

    #[test]
    fn test_validate_empty_base_url_fails() {
        let config = Config {
            sync: Some(SyncConfig {
                base_url: "  ".to_string(),
                ..sync_config()
            }),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_interval_fails() {
        let config = Config {
            sync: Some(SyncConfig {
                interval_secs: 0,
                ..sync_config()
            }),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_authenticated_requires_token() {
        let mut sync = SyncConfig {
            authenticated: true,
            ..sync_config()
        };
        let config = Config {
            sync: Some(sync.clone()),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());

        sync.token = Some("secret".to_string());
        let config = Config {
            sync: Some(sync),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }
}
