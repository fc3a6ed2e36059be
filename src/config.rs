//! Configuration management for the Palimpsest server

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub blob: BlobConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Settings for fetching uploaded blobs by URL
#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    /// Request timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Upper bound on fetched blob size in bytes
    pub max_blob_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            blob: BlobConfig {
                fetch_timeout_secs: 30,
                max_blob_bytes: 50 * 1024 * 1024,
            },
            database: DatabaseConfig {
                url: "sqlite:./palimpsest.db".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(defaults.server.port),
            },
            blob: BlobConfig {
                fetch_timeout_secs: env::var("BLOB_FETCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.blob.fetch_timeout_secs),
                max_blob_bytes: env::var("BLOB_MAX_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.blob.max_blob_bytes),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
        })
    }
}
