use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{ResolveResponse, ShortenRequest, ShortenResponse};
use crate::shortener::{ShortenStatus, Shortener, ShortenerError};

pub struct AppState {
    pub shortener: Arc<Shortener>,
    pub public_base_url: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn shortener_error(err: ShortenerError) -> ApiError {
    tracing::error!(error = %err, "storage request failed");
    match err {
        ShortenerError::StorageUnavailable(_) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Storage is unavailable, please try again later",
        ),
        ShortenerError::Internal(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Only `http://` and `https://` URLs are accepted for shortening
pub fn validate_url_scheme(url: &str) -> Result<(), &'static str> {
    if url.is_empty() {
        return Err("URL cannot be empty");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err("URL must start with http:// or https://");
    }
    Ok(())
}

/// Full short URL for `id` under `base_url`
pub fn short_url(base_url: &str, id: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), id)
}

/// Shorten a URL
pub async fn create_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), ApiError> {
    let url = payload.url.trim();
    validate_url_scheme(url).map_err(|msg| error_response(StatusCode::BAD_REQUEST, msg))?;

    let shortened = state.shortener.shorten(url).await.map_err(shortener_error)?;

    let (status_code, original_url) = match &shortened.status {
        ShortenStatus::Created => (StatusCode::CREATED, url.to_string()),
        ShortenStatus::AlreadyExists => (StatusCode::OK, url.to_string()),
        ShortenStatus::Collision { existing_url } => (StatusCode::OK, existing_url.clone()),
    };

    Ok((
        status_code,
        Json(ShortenResponse {
            short_url: short_url(&state.public_base_url, &shortened.id),
            id: shortened.id,
            original_url,
            status: shortened.status.as_str(),
        }),
    ))
}

/// Look up the original URL for a short id
pub async fn get_url(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ResolveResponse>, ApiError> {
    match state.shortener.resolve(&id).await {
        Ok(Some(original_url)) => Ok(Json(ResolveResponse { id, original_url })),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "URL not found")),
        Err(e) => Err(shortener_error(e)),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
