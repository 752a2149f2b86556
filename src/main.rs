use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hashurl::config::Config;
use hashurl::{api, redirect, storage, Shortener};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration");

    let storage = storage::connect(&config.database, config.cache.max_entries).await?;
    let shortener = Arc::new(Shortener::new(storage, config.key_deriver()?));
    info!("Short ids are {} hex characters", config.short_id_length);

    let api_router = api::create_api_router(Arc::clone(&shortener), config.public_base_url.clone());
    let redirect_router = redirect::create_redirect_router(Arc::clone(&shortener));

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 API server listening on http://{}", api_addr);

    let redirect_addr = format!(
        "{}:{}",
        config.redirect_server.host, config.redirect_server.port
    );
    let redirect_listener = tokio::net::TcpListener::bind(&redirect_addr).await?;
    info!("🚀 Redirect server listening on http://{}", redirect_addr);
    info!("   - Short URLs are printed as {}/<id>", config.public_base_url);

    tokio::try_join!(
        axum::serve(api_listener, api_router),
        axum::serve(redirect_listener, redirect_router),
    )?;

    Ok(())
}
