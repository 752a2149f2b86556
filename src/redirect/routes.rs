use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::shortener::Shortener;

use super::handlers::{health_check, redirect_url, RedirectState};
use super::middleware::record_request_start;

pub fn create_redirect_router(shortener: Arc<Shortener>) -> Router {
    let state = Arc::new(RedirectState { shortener });

    Router::new()
        .route("/", get(health_check))
        .route("/{id}", get(redirect_url))
        .layer(middleware::from_fn(record_request_start))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
