/// Configuration management for the folio server
///
/// Handles server binding, database location and admin account provisioning.

use crate::auth::provider::DEFAULT_SESSION_TTL_DAYS;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Identity provider configuration
    pub auth: AuthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration for the document store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding the database file (default: "data")
    pub data_dir: String,
    /// SQLite connection URL (default: "sqlite://{data_dir}/folio.db")
    /// "sqlite::memory:" keeps everything in a single in-memory connection
    pub url: String,
}

/// Admin account provisioned at startup
///
/// Provisioning is skipped unless both values are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub admin_email: Option<String>,
    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
    /// Days an issued session stays valid (default: 30)
    pub session_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: None,
            admin_password: None,
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }
}

impl DatabaseConfig {
    /// Whether the configured database lives only in memory
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

impl Config {
    /// Configuration for tests and throwaway instances: in-memory database, ephemeral port
    pub fn in_memory() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                data_dir: "data".to_string(),
                url: "sqlite::memory:".to_string(),
            },
            auth: AuthConfig::default(),
        }
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for k8s/container deployment
    fn default() -> Self {
        let data_dir = std::env::var("FOLIO_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let url = std::env::var("FOLIO_DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite://{}/folio.db", data_dir));

        Self {
            server: ServerConfig {
                host: std::env::var("FOLIO_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("FOLIO_PORT")
                    .unwrap_or_else(|_| "3005".to_string())
                    .parse()
                    .unwrap_or(3005),
            },
            database: DatabaseConfig { data_dir, url },
            auth: AuthConfig {
                admin_email: std::env::var("FOLIO_ADMIN_EMAIL").ok().filter(|v| !v.is_empty()),
                admin_password: std::env::var("FOLIO_ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
                session_ttl_days: std::env::var("FOLIO_SESSION_TTL_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|days| *days > 0)
                    .unwrap_or(DEFAULT_SESSION_TTL_DAYS),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_config() {
        let config = Config::in_memory();
        assert!(config.database.is_in_memory());
        assert_eq!(config.server.port, 0);
        assert!(config.auth.admin_email.is_none());
        assert_eq!(config.auth.session_ttl(), chrono::Duration::days(30));
    }

    #[test]
    fn test_file_database_is_not_in_memory() {
        let db = DatabaseConfig {
            data_dir: "data".to_string(),
            url: "sqlite://data/folio.db".to_string(),
        };
        assert!(!db.is_in_memory());
    }
}
