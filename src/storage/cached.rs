use crate::models::UrlMapping;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;

/// Read-through cache in front of another storage backend.
///
/// Mappings are never updated or deleted, so a cached row can not go stale.
/// Misses are not cached: another process may create the row at any time.
pub struct CachedStorage {
    /// Underlying storage implementation
    inner: Arc<dyn Storage>,
    /// Positive lookups keyed by short id
    read_cache: Cache<String, UrlMapping>,
}

impl CachedStorage {
    pub fn new(inner: Arc<dyn Storage>, max_cache_entries: u64) -> Self {
        let read_cache = Cache::builder().max_capacity(max_cache_entries).build();

        Self { inner, read_cache }
    }

    /// Whether `id` is currently held in the read cache
    pub async fn is_cached(&self, id: &str) -> bool {
        self.read_cache.get(id).await.is_some()
    }
}

#[async_trait]
impl Storage for CachedStorage {
    async fn init(&self) -> Result<()> {
        self.inner.init().await
    }

    async fn create(&self, id: &str, original_url: &str) -> StorageResult<UrlMapping> {
        match self.inner.create(id, original_url).await {
            Ok(url) => {
                self.read_cache.insert(id.to_string(), url.clone()).await;
                Ok(url)
            }
            Err(StorageError::DuplicateKey { existing }) => {
                // The holder of the id is known now, keep it warm
                self.read_cache
                    .insert(id.to_string(), (*existing).clone())
                    .await;
                Err(StorageError::DuplicateKey { existing })
            }
            Err(e) => Err(e),
        }
    }

    async fn get(&self, id: &str) -> StorageResult<Option<UrlMapping>> {
        if let Some(cached) = self.read_cache.get(id).await {
            return Ok(Some(cached));
        }

        let result = self.inner.get(id).await?;

        if let Some(ref url) = result {
            self.read_cache.insert(id.to_string(), url.clone()).await;
        }

        Ok(result)
    }

    async fn count(&self) -> StorageResult<i64> {
        self.inner.count().await
    }
}
