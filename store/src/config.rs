//! Store configuration.

use std::time::Duration;

use tokenledger_common::{LedgerError, Result};

/// PostgreSQL connection settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of idle connections to keep.
    pub min_connections: u32,
    /// Connection acquisition timeout.
    pub acquire_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/tokenledger".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(max) = std::env::var("TOKENLEDGER_DB_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse() {
                config.max_connections = max;
            }
        }

        if let Ok(secs) = std::env::var("TOKENLEDGER_DB_ACQUIRE_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.acquire_timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(LedgerError::ConfigurationError(
                "Database URL cannot be empty".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(LedgerError::ConfigurationError(
                "Max connections cannot be 0".to_string(),
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(LedgerError::ConfigurationError(
                "Min connections cannot exceed max connections".to_string(),
            ));
        }

        Ok(())
    }
}
