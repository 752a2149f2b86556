use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::shortener::Shortener;

use super::handlers::{create_url, get_url, health_check, AppState};

pub fn create_api_router(shortener: Arc<Shortener>, public_base_url: String) -> Router {
    let state = Arc::new(AppState {
        shortener,
        public_base_url,
    });

    let url_routes = Router::new()
        .route("/urls", post(create_url))
        .route("/urls/{id}", get(get_url))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", url_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
