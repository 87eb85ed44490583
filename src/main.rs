use std::sync::Arc;

use marquee_api::{
    config::{Config, StoreBackend},
    db::{create_redis_client, Cache, KeyValueStore, MemoryStore, RedisStore},
    routes::{create_router, AppState, SearchSettings},
    services::{CatalogProvider, TmdbProvider},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marquee_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn KeyValueStore> = match config.store_backend {
        StoreBackend::Redis => Arc::new(RedisStore::new(create_redis_client(&config.redis_url)?)),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };

    let api_key = config.api_key();
    if api_key.is_none() {
        tracing::warn!("TMDB_API_KEY is not set; catalog requests will fail until it is configured");
    }

    let (cache, cache_writer) = Cache::new(store.clone());
    let provider: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::new(
        cache,
        api_key,
        config.tmdb_api_url.clone(),
    ));

    let state = Arc::new(AppState::new(provider, store.clone(), SearchSettings::from(&config)));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        address = %addr,
        store = store.name(),
        page_cap = config.page_cap,
        suggestion_limit = config.suggestion_limit,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
