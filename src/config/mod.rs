use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::keys::{KeyDeriver, DEFAULT_ID_LENGTH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub redirect_server: ServerConfig,
    /// Prefix used when printing short URLs, e.g. `http://localhost:3000`
    pub public_base_url: String,
    pub short_id_length: usize,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 0 disables the read cache
    pub max_entries: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let backend = match var("DATABASE_BACKEND", "sqlite").to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres"
                );
                DatabaseBackend::Sqlite
            }
        };

        let database_url = var("DATABASE_URL", "sqlite://./urls.db");
        let max_connections = var("DATABASE_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;
        anyhow::ensure!(
            max_connections > 0,
            "DATABASE_MAX_CONNECTIONS must be a positive integer, got 0"
        );

        let api_host = var("API_HOST", "127.0.0.1");
        let api_port = var("API_PORT", "8080")
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let redirect_host = var("REDIRECT_HOST", "127.0.0.1");
        let redirect_port = var("REDIRECT_PORT", "3000")
            .parse::<u16>()
            .context("REDIRECT_PORT must be a valid port number")?;

        let public_base_url = var("PUBLIC_BASE_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();

        let short_id_length = var("SHORT_ID_LENGTH", &DEFAULT_ID_LENGTH.to_string())
            .parse::<usize>()
            .context("SHORT_ID_LENGTH must be an integer")?;
        // Reject bad lengths at startup rather than on first use
        KeyDeriver::new(short_id_length)?;

        let cache_max_entries = var("CACHE_MAX_ENTRIES", "10000")
            .parse::<u64>()
            .context("CACHE_MAX_ENTRIES must be a non-negative integer")?;

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            redirect_server: ServerConfig {
                host: redirect_host,
                port: redirect_port,
            },
            public_base_url,
            short_id_length,
            cache: CacheConfig {
                max_entries: cache_max_entries,
            },
        })
    }

    pub fn key_deriver(&self) -> anyhow::Result<KeyDeriver> {
        Ok(KeyDeriver::new(self.short_id_length)?)
    }
}
