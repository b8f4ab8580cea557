use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{best_effort, validate_num, AppState};
use crate::{
    error::AppResult,
    models::{Movie, MovieDetailsView, MovieSearchResult, Recommendation},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    num: Option<usize>,
}

/// Full-text movie search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieSearchResult>>> {
    let limit = params.limit.unwrap_or(state.defaults.search_limit);
    let results = state.catalog.search_movies(&params.q, limit).await?;
    Ok(Json(results))
}

/// Raw catalog document
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.catalog.get_movie(&movie_id).await?))
}

/// Metadata from the movie database
pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<MovieDetailsView>> {
    let details = state.metadata.fetch_movie_details(&movie_id).await?;
    Ok(Json(MovieDetailsView::new(
        details,
        state.catalog.image_base_url(),
    )))
}

/// Content-based neighbours of a movie
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
    Query(params): Query<SimilarQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let num = validate_num(params.num, state.defaults.num_recommendations)?;
    let recs = best_effort(
        state.recommender.similar_movies(&movie_id, num).await,
        "similar_movies",
    )?;
    Ok(Json(recs))
}
