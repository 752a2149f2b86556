use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UrlMapping {
    pub id: String,
    pub original_url: String,
    /// Unix epoch seconds, set when the row is inserted
    pub created_at: i64,
}

impl UrlMapping {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub id: String,
    pub short_url: String,
    pub original_url: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub id: String,
    pub original_url: String,
}
