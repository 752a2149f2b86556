pub mod cached;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use cached::CachedStorage;
pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{Storage, StorageError, StorageResult};

use crate::config::{DatabaseBackend, DatabaseConfig};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Open the configured backend and ensure its schema exists.
///
/// A positive `cache_max_entries` wraps the backend in a [`CachedStorage`].
pub async fn connect(config: &DatabaseConfig, cache_max_entries: u64) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", config.url);
            Arc::new(SqliteStorage::new(&config.url, config.max_connections).await?)
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage");
            Arc::new(PostgresStorage::new(&config.url, config.max_connections).await?)
        }
    };

    storage.init().await?;
    info!("Database initialized successfully");

    if cache_max_entries == 0 {
        return Ok(storage);
    }

    Ok(Arc::new(CachedStorage::new(storage, cache_max_entries)))
}
