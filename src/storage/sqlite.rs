use crate::models::UrlMapping;
use crate::storage::trait_def::unix_now;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        // WAL needs a real file; in-memory databases keep the default journal
        if !database_url.contains(":memory:") {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                id TEXT PRIMARY KEY,
                original_url TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create(&self, id: &str, original_url: &str) -> StorageResult<UrlMapping> {
        let created_at = unix_now()?;

        // Both statements run on one connection, returned to the pool on drop
        let mut conn = self.pool.acquire().await?;

        let inserted = sqlx::query_as::<_, UrlMapping>(
            r#"
            INSERT INTO urls (id, original_url, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            RETURNING id, original_url, created_at
            "#,
        )
        .bind(id)
        .bind(original_url)
        .bind(created_at)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(url) = inserted {
            return Ok(url);
        }

        let existing = sqlx::query_as::<_, UrlMapping>(
            r#"
            SELECT id, original_url, created_at
            FROM urls
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        Err(StorageError::DuplicateKey {
            existing: Box::new(existing),
        })
    }

    async fn get(&self, id: &str) -> StorageResult<Option<UrlMapping>> {
        let url = sqlx::query_as::<_, UrlMapping>(
            r#"
            SELECT id, original_url, created_at
            FROM urls
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(url)
    }

    async fn count(&self) -> StorageResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM urls")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
