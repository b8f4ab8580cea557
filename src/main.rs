use anyhow::Result;
use std::sync::Arc;

use movie_recommender::{
    bootstrap,
    cache::{create_redis_client, Cache, CacheWriterHandle},
    config::Config,
    routes::{create_router, AppState, RequestDefaults},
    services::TmdbProvider,
};

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing("info");

    let config = Config::from_env()?;
    tracing::info!(
        elasticsearch_url = %config.elasticsearch_url,
        movies_index = %config.movies_index,
        bind_addr = %config.bind_addr(),
        "Loaded configuration"
    );

    let (cache, cache_handle) = connect_cache(&config).await;

    let engine = bootstrap::search_engine(&config)?;
    let (catalog, recommender) = bootstrap::build_recommender(engine, &config).await;
    let metadata = TmdbProvider::from_config(&config, cache)?;

    let state = Arc::new(AppState {
        catalog,
        recommender,
        metadata: Arc::new(metadata),
        defaults: RequestDefaults::from_config(&config),
    });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

/// Redis is optional; without it every metadata lookup goes upstream
async fn connect_cache(config: &Config) -> (Option<Cache>, Option<CacheWriterHandle>) {
    let Some(redis_url) = config.redis_url.as_deref() else {
        tracing::info!("REDIS_URL not set; metadata caching disabled");
        return (None, None);
    };

    match create_redis_client(redis_url) {
        Ok(client) => {
            let (cache, handle) = Cache::new(client).await;
            (Some(cache), Some(handle))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Invalid Redis configuration; metadata caching disabled");
            (None, None)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
