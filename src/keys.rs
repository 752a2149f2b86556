use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of a short id when nothing else is configured
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Hex characters in a full SHA-256 digest
pub const MAX_ID_LENGTH: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("short id length must be between 1 and {MAX_ID_LENGTH}, got {0}")]
    InvalidIdLength(usize),
}

/// Derives short ids from URLs.
///
/// The id is the first `length` lowercase hex characters of the SHA-256
/// digest of the URL bytes, so the same URL always maps to the same id.
/// Truncation leaves a keyspace of `16^length`; collisions are possible and
/// are resolved by the store, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDeriver {
    length: usize,
}

impl KeyDeriver {
    pub fn new(length: usize) -> Result<Self, KeyError> {
        if length == 0 || length > MAX_ID_LENGTH {
            return Err(KeyError::InvalidIdLength(length));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn derive(&self, url: &str) -> String {
        let digest = Sha256::digest(url.as_bytes());
        let mut hex = format!("{:x}", digest);
        hex.truncate(self.length);
        hex
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self {
            length: DEFAULT_ID_LENGTH,
        }
    }
}
