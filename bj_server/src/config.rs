//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use blackjack::TableConfig;
use std::net::SocketAddr;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,
    /// Table defaults applied to every spawned table
    pub table: TableConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// `bind_override` takes precedence over `SERVER_BIND` (it comes from
    /// CLI args).
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                "127.0.0.1:6969"
                    .parse()
                    .expect("Default bind address is valid")
            });

        let metrics_bind = match std::env::var("METRICS_BIND") {
            Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("`{raw}` is not a socket address"),
            })?),
            Err(_) => None,
        };

        let table = TableConfig {
            max_seats: parse_env_or("TABLE_MAX_PLAYERS", 7),
            starting_chips: parse_env_or("STARTING_CHIPS", 1_000),
            deck_sets: parse_env_or("DECK_SETS", 1),
            dealer_pause_ms: parse_env_or("DEALER_PAUSE_MS", 1_000),
            restart_delay_ms: parse_env_or("ROUND_RESTART_MS", 5_000),
            deck_fetch_timeout_ms: parse_env_or("DECK_FETCH_TIMEOUT_MS", 2_000),
        };

        let config = ServerConfig {
            bind,
            metrics_bind,
            table,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate().map_err(|reason| ConfigError::Invalid {
            var: "table defaults".to_string(),
            reason,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "METRICS_BIND".to_string(),
            reason: "`nope` is not a socket address".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("METRICS_BIND"));
        assert!(msg.contains("nope"));
    }

    #[test]
    fn test_config_validation_rejects_zero_seats() {
        let config = ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            metrics_bind: None,
            table: TableConfig {
                max_seats: 0, // Invalid
                ..TableConfig::default()
            },
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_default_table_config_is_valid() {
        let config = ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            metrics_bind: None,
            table: TableConfig::default(),
        };
        assert!(config.validate().is_ok());
    }
}
