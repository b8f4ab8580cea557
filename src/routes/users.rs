use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{best_effort, build_cards, validate_num, AppState};
use crate::{
    error::AppResult,
    models::{MovieCard, MovieDetailsView},
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NumQuery {
    num: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    movie_id: Option<String>,
    num: Option<usize>,
}

/// The selected movie's details and what to watch after it
#[derive(Debug, Serialize)]
pub struct SelectedMovie {
    pub movie_id: String,
    pub details: Option<MovieDetailsView>,
    pub recommendations: Vec<MovieCard>,
}

/// Everything the home page shows for one user
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user_id: String,
    pub recommendations: Vec<MovieCard>,
    pub selected: Option<SelectedMovie>,
}

/// User ids for the user picker
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<String>>> {
    let limit = params.limit.unwrap_or(state.defaults.user_list_limit);
    let users = state.catalog.list_user_ids(limit).await?;
    Ok(Json(users))
}

/// "Movies you may like" grid
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<NumQuery>,
) -> AppResult<Json<Vec<MovieCard>>> {
    let num = validate_num(params.num, state.defaults.num_recommendations)?;
    Ok(Json(user_cards(&state, &user_id, num).await?))
}

/// Personal grid plus, when a movie is selected, its details and hybrid grid
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<DashboardQuery>,
) -> AppResult<Json<Dashboard>> {
    let num = validate_num(params.num, state.defaults.num_recommendations)?;

    let recommendations = user_cards(&state, &user_id, num).await?;

    let selected = match params.movie_id.filter(|id| !id.trim().is_empty()) {
        Some(movie_id) => Some(selected_movie(&state, &user_id, movie_id, num).await?),
        None => None,
    };

    Ok(Json(Dashboard {
        user_id,
        recommendations,
        selected,
    }))
}

async fn user_cards(state: &AppState, user_id: &str, num: usize) -> AppResult<Vec<MovieCard>> {
    let recs = best_effort(
        state.recommender.user_recommendations(user_id, num).await,
        "user_recommendations",
    )?;

    let scored = recs
        .into_iter()
        .map(|rec| (rec.movie, rec.weighted_rating))
        .collect();
    Ok(build_cards(state, scored).await)
}

async fn selected_movie(
    state: &AppState,
    user_id: &str,
    movie_id: String,
    num: usize,
) -> AppResult<SelectedMovie> {
    let (details, hybrid) = tokio::join!(
        state.metadata.fetch_movie_details(&movie_id),
        state.recommender.hybrid_recommendations(
            user_id,
            &movie_id,
            state.defaults.hybrid_alpha,
            num
        ),
    );

    let details = match details {
        Ok(details) => Some(MovieDetailsView::new(
            details,
            state.catalog.image_base_url(),
        )),
        Err(e) => {
            tracing::warn!(movie_id = %movie_id, error = %e, "Movie details unavailable");
            None
        }
    };

    let scored = best_effort(hybrid, "hybrid_recommendations")?
        .into_iter()
        .map(|rec| (rec.movie, rec.score))
        .collect();
    let recommendations = build_cards(state, scored).await;

    Ok(SelectedMovie {
        movie_id,
        details,
        recommendations,
    })
}
