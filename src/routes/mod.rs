use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    middleware::{make_span_with_request_id, request_id_middleware},
    models::{Movie, MovieCard},
    services::{Catalog, MetadataProvider, Recommender},
};

pub mod movies;
pub mod recommendations;
pub mod stats;
pub mod users;

/// Fallbacks for query parameters the caller leaves out
#[derive(Debug, Clone, Copy)]
pub struct RequestDefaults {
    pub num_recommendations: usize,
    pub hybrid_alpha: f64,
    pub search_limit: usize,
    pub user_list_limit: usize,
}

impl RequestDefaults {
    pub fn from_config(config: &Config) -> Self {
        Self {
            num_recommendations: config.num_recommendations,
            hybrid_alpha: config.hybrid_alpha,
            ..Self::default()
        }
    }
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            num_recommendations: 10,
            hybrid_alpha: 0.5,
            search_limit: 10,
            user_list_limit: 100,
        }
    }
}

/// Shared, read-only application state
pub struct AppState {
    pub catalog: Catalog,
    pub recommender: Recommender,
    pub metadata: Arc<dyn MetadataProvider>,
    pub defaults: RequestDefaults,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list))
        .route("/users/:user_id/recommendations", get(users::recommendations))
        .route("/users/:user_id/dashboard", get(users::dashboard))
        .route("/movies/search", get(movies::search))
        .route("/movies/:movie_id", get(movies::get_movie))
        .route("/movies/:movie_id/details", get(movies::details))
        .route("/movies/:movie_id/similar", get(movies::similar))
        .route("/recommendations/hybrid", get(recommendations::hybrid))
        .route("/stats", get(stats::stats))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Largest result list a caller may ask for
pub const MAX_NUM: usize = 100;

/// Keeps `num` within `1..=MAX_NUM`
pub(crate) fn validate_num(num: Option<usize>, default: usize) -> AppResult<usize> {
    match num.unwrap_or(default) {
        0 => Err(AppError::InvalidInput("num must be at least 1".to_string())),
        num if num > MAX_NUM => Err(AppError::InvalidInput(format!(
            "num must be at most {}, got {}",
            MAX_NUM, num
        ))),
        num => Ok(num),
    }
}

/// Recommendation lists degrade to empty instead of failing the request
///
/// Bad caller input is still reported as such.
pub(crate) fn best_effort<T>(result: AppResult<Vec<T>>, operation: &'static str) -> AppResult<Vec<T>> {
    match result {
        Ok(items) => Ok(items),
        Err(e @ AppError::InvalidInput(_)) => Err(e),
        Err(e) => {
            tracing::warn!(operation = operation, error = %e, "Returning empty recommendations");
            Ok(Vec::new())
        }
    }
}

/// Decorates scored movies with metadata, fetched in parallel
pub(crate) async fn build_cards(state: &AppState, scored: Vec<(Movie, f64)>) -> Vec<MovieCard> {
    let ids = scored.iter().map(|(movie, _)| movie.movie_id.clone()).collect();
    let details = state.metadata.fetch_details_batch(ids).await;

    scored
        .iter()
        .zip(details.iter())
        .map(|((movie, score), details)| {
            MovieCard::build(movie, *score, details.as_ref(), state.catalog.image_base_url())
        })
        .collect()
}
