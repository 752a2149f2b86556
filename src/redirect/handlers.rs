use axum::{
    extract::{Path, State},
    http::{header::HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::middleware::RequestStart;
use crate::shortener::{Shortener, ShortenerError};

pub const TIMING_HEADER: &str = "x-hashurl-timing-total-ms";

pub struct RedirectState {
    pub shortener: Arc<Shortener>,
}

/// Redirect to original URL
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(id): Path<String>,
    Extension(RequestStart(request_start)): Extension<RequestStart>,
) -> impl IntoResponse {
    match state.shortener.resolve(&id).await {
        Ok(Some(original_url)) => {
            // Stored URLs are only checked for their scheme; some can not go in a Location header
            if HeaderValue::try_from(original_url.as_str()).is_err() {
                tracing::warn!(short_id = %id, "stored URL is not a valid redirect target");
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "The stored URL can not be used as a redirect target",
                )
                    .into_response();
            }

            let total_ms = request_start.elapsed().as_millis() as u64;

            let mut response_headers = HeaderMap::new();
            response_headers.insert(TIMING_HEADER, HeaderValue::from(total_ms));

            (response_headers, Redirect::permanent(&original_url)).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "URL not found").into_response(),
        Err(e) => {
            tracing::error!(short_id = %id, error = %e, "failed to resolve short id");
            match e {
                ShortenerError::StorageUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage is unavailable, please try again later",
                )
                    .into_response(),
                ShortenerError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
                }
            }
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
