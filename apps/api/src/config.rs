//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                        | Default          |
//! |---------------------------------|------------------|
//! | `MEDBILL_HTTP_PORT`             | `8080`           |
//! | `MEDBILL_BIND_HOST`             | `0.0.0.0`        |
//! | `MEDBILL_DB_PATH`               | `./medbill.db`   |
//! | `MEDBILL_DB_MAX_CONNECTIONS`    | `5`              |
//! | `MEDBILL_CLINIC_NAME`           | `MedBill Clinic` |
//! | `MEDBILL_NEGATIVE_TOTAL_POLICY` | `allow`          |

use medbill_core::NegativeTotalPolicy;
use std::env;
use std::path::PathBuf;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Interface to bind
    pub bind_host: String,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size for the invoice store
    pub db_max_connections: u32,

    /// Printed at the top of every invoice
    pub clinic_name: String,

    /// What to do when a discount exceeds the billed amount
    pub negative_total_policy: NegativeTotalPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 8080,
            bind_host: "0.0.0.0".to_string(),
            database_path: PathBuf::from("./medbill.db"),
            db_max_connections: 5,
            clinic_name: "MedBill Clinic".to_string(),
            negative_total_policy: NegativeTotalPolicy::Allow,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of a
    /// variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            http_port: match lookup("MEDBILL_HTTP_PORT") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("MEDBILL_HTTP_PORT".to_string()))?,
                None => defaults.http_port,
            },

            bind_host: lookup("MEDBILL_BIND_HOST").unwrap_or(defaults.bind_host),

            database_path: lookup("MEDBILL_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            db_max_connections: match lookup("MEDBILL_DB_MAX_CONNECTIONS") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("MEDBILL_DB_MAX_CONNECTIONS".to_string())
                })?,
                None => defaults.db_max_connections,
            },

            clinic_name: lookup("MEDBILL_CLINIC_NAME").unwrap_or(defaults.clinic_name),

            negative_total_policy: match lookup("MEDBILL_NEGATIVE_TOTAL_POLICY") {
                Some(raw) => raw.parse().map_err(|_| {
                    ConfigError::InvalidValue("MEDBILL_NEGATIVE_TOTAL_POLICY".to_string())
                })?,
                None => defaults.negative_total_policy,
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "MEDBILL_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        if config.clinic_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired("MEDBILL_CLINIC_NAME".to_string()));
        }

        Ok(config)
    }

    /// `host:port` to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.http_port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
