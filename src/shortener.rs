//! Core boundary: `shorten` and `resolve`.
//!
//! The shortener owns no state besides the injected storage handle and the
//! key deriver. Conflicting writes are serialized by the storage engine's
//! primary key; a duplicate key is an expected outcome, never an error.

use std::sync::Arc;

use thiserror::Error;
use tracing::{instrument, warn};

use crate::keys::KeyDeriver;
use crate::storage::{Storage, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortenStatus {
    /// First time this id was stored
    Created,
    /// The same URL was already stored under this id
    AlreadyExists,
    /// A different URL already holds this id. It is kept as is and its id is
    /// returned, so `resolve` yields `existing_url`, not the URL passed in.
    Collision { existing_url: String },
}

impl ShortenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShortenStatus::Created => "created",
            ShortenStatus::AlreadyExists => "already_exists",
            ShortenStatus::Collision { .. } => "collision",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    pub id: String,
    pub status: ShortenStatus,
}

#[derive(Debug, Error)]
pub enum ShortenerError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),
    /// The storage answered, but with something the operation can not handle
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ShortenerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(e) => ShortenerError::StorageUnavailable(e),
            // Only `shorten` expects duplicates, and it matches them before converting
            dup @ StorageError::DuplicateKey { .. } => ShortenerError::Internal(dup.to_string()),
        }
    }
}

pub struct Shortener {
    storage: Arc<dyn Storage>,
    deriver: KeyDeriver,
}

impl Shortener {
    pub fn new(storage: Arc<dyn Storage>, deriver: KeyDeriver) -> Self {
        Self { storage, deriver }
    }

    pub fn deriver(&self) -> &KeyDeriver {
        &self.deriver
    }

    /// Store `url` under its derived id and return the id.
    ///
    /// Fails only when the storage is unreachable.
    #[instrument(skip(self))]
    pub async fn shorten(&self, url: &str) -> Result<Shortened, ShortenerError> {
        let id = self.deriver.derive(url);

        let status = match self.storage.create(&id, url).await {
            Ok(_) => ShortenStatus::Created,
            Err(StorageError::DuplicateKey { existing }) if existing.original_url == url => {
                ShortenStatus::AlreadyExists
            }
            Err(StorageError::DuplicateKey { existing }) => {
                warn!(
                    short_id = %id,
                    existing_url = %existing.original_url,
                    "short id collision, keeping the existing mapping"
                );
                ShortenStatus::Collision {
                    existing_url: existing.original_url,
                }
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Shortened { id, status })
    }

    /// Look up the URL stored under `id`. `Ok(None)` means the id is unknown.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: &str) -> Result<Option<String>, ShortenerError> {
        let url = self.storage.get(id).await?;
        Ok(url.map(|u| u.original_url))
    }

    /// Number of stored mappings
    pub async fn stats(&self) -> Result<i64, ShortenerError> {
        Ok(self.storage.count().await?)
    }
}
