//! Wiring shared by the server and the evaluation CLI.

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    error::AppResult,
    services::{
        Catalog, ElasticsearchClient, GlobalStats, Recommender, RecommenderSettings,
        SearchEngine, WeightedRating,
    },
};

/// Installs the global subscriber; `RUST_LOG` overrides `default_filter`
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

pub fn search_engine(config: &Config) -> AppResult<Arc<dyn SearchEngine>> {
    let client = ElasticsearchClient::from_config(config)?;
    Ok(Arc::new(client))
}

/// Catalog statistics, or zeros when the engine cannot provide them
pub async fn load_global_stats(catalog: &Catalog, config: &Config) -> GlobalStats {
    match catalog.global_stats(config.min_votes_percentile).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to compute catalog statistics; using defaults");
            GlobalStats::default()
        }
    }
}

/// Catalog and recommender over one engine, stats computed once
pub async fn build_recommender(
    engine: Arc<dyn SearchEngine>,
    config: &Config,
) -> (Catalog, Recommender) {
    let catalog = Catalog::from_config(engine.clone(), config);
    let stats = load_global_stats(&catalog, config).await;

    let recommender = Recommender::new(
        engine,
        WeightedRating::from_config(stats, config),
        RecommenderSettings::from_config(config),
    );

    (catalog, recommender)
}
