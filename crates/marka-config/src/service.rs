use sea_orm::DatabaseBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigServiceError {
    #[error("Invalid configuration: {details}")]
    InvalidConfiguration { details: String },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    // Required fields
    pub address: String,
    pub database_url: String,

    // Fixed value
    pub api_base_url: String,

    // PostgreSQL connection pool settings (all optional with defaults)
    pub postgres_max_connections: Option<u32>,
    pub postgres_min_connections: Option<u32>,
    pub postgres_connect_timeout_secs: Option<u64>,
    pub postgres_acquire_timeout_secs: Option<u64>,
}

impl ServerConfig {
    /// Create a new configuration with minimal parameters
    ///
    /// Pool settings are read from MARKA_POSTGRES_* environment variables
    /// when set.
    pub fn new(address: String, database_url: String) -> anyhow::Result<Self> {
        if database_url.is_empty() {
            anyhow::bail!("database URL must not be empty");
        }

        Ok(ServerConfig {
            address,
            database_url,
            api_base_url: "/api".to_string(),
            postgres_max_connections: std::env::var("MARKA_POSTGRES_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(Some(100)),
            postgres_min_connections: std::env::var("MARKA_POSTGRES_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(Some(10)),
            postgres_connect_timeout_secs: std::env::var("MARKA_POSTGRES_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(Some(30)),
            postgres_acquire_timeout_secs: std::env::var("MARKA_POSTGRES_ACQUIRE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(Some(30)),
        })
    }

    pub fn get_postgres_max_connections(&self) -> u32 {
        self.postgres_max_connections.unwrap_or(100)
    }

    pub fn get_postgres_min_connections(&self) -> u32 {
        self.postgres_min_connections.unwrap_or(10)
    }

    pub fn get_postgres_connect_timeout_secs(&self) -> u64 {
        self.postgres_connect_timeout_secs.unwrap_or(30)
    }

    pub fn get_postgres_acquire_timeout_secs(&self) -> u64 {
        self.postgres_acquire_timeout_secs.unwrap_or(30)
    }
}

/// Service that provides centralized access to server configuration
pub struct ConfigService {
    config: Arc<ServerConfig>,
}

impl ConfigService {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self { config }
    }

    pub fn get_database_url(&self) -> String {
        self.config.database_url.clone()
    }

    pub fn get_server_config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    /// Get the database backend type from the configured database URL
    pub fn get_database_backend(&self) -> DatabaseBackend {
        let database_url = &self.config.database_url;

        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            DatabaseBackend::Postgres
        } else if database_url.starts_with("sqlite://") || database_url.starts_with("sqlite:") {
            DatabaseBackend::Sqlite
        } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
            DatabaseBackend::MySql
        } else {
            tracing::warn!(
                "Unknown database URL scheme, defaulting to Postgres: {}",
                database_url
            );
            DatabaseBackend::Postgres
        }
    }

    pub fn is_postgres(&self) -> bool {
        matches!(self.get_database_backend(), DatabaseBackend::Postgres)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::new(
            "127.0.0.1:8000".to_string(),
            "postgres://localhost/marka".to_string(),
        )
        .unwrap();

        assert_eq!(config.api_base_url, "/api");
        assert_eq!(config.get_postgres_max_connections(), 100);
        assert_eq!(config.get_postgres_min_connections(), 10);
    }

    #[test]
    fn test_server_config_rejects_empty_database_url() {
        let result = ServerConfig::new("127.0.0.1:8000".to_string(), String::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_database_backend_detection() {
        let config = Arc::new(
            ServerConfig::new(
                "127.0.0.1:8000".to_string(),
                "postgresql://localhost/marka".to_string(),
            )
            .unwrap(),
        );
        let service = ConfigService::new(config);
        assert!(service.is_postgres());
    }
}
