use crate::models::UrlMapping;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The id is already taken. Carries the row that holds it.
    #[error("short id '{}' already exists", existing.id)]
    DuplicateKey { existing: Box<UrlMapping> },
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Unavailable(err.into())
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the `urls` table if it does not exist yet. Safe to call on every start.
    async fn init(&self) -> Result<()>;

    /// Insert a mapping unless the id is taken.
    ///
    /// Uniqueness is enforced by the primary key, so concurrent callers racing
    /// on the same id see exactly one success; the rest get `DuplicateKey`.
    async fn create(&self, id: &str, original_url: &str) -> StorageResult<UrlMapping>;

    /// Look up a mapping by id
    async fn get(&self, id: &str) -> StorageResult<Option<UrlMapping>>;

    /// Number of stored mappings
    async fn count(&self) -> StorageResult<i64>;
}

pub(crate) fn unix_now() -> StorageResult<i64> {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| StorageError::Unavailable(e.into()))?
        .as_secs();
    Ok(secs as i64)
}
