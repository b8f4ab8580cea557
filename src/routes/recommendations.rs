use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{best_effort, build_cards, validate_num, AppState};
use crate::{error::AppResult, models::MovieCard};

#[derive(Debug, Deserialize)]
pub struct HybridQuery {
    user_id: String,
    movie_id: String,
    alpha: Option<f64>,
    num: Option<usize>,
}

/// Blend of the user's taste and the selected movie
pub async fn hybrid(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HybridQuery>,
) -> AppResult<Json<Vec<MovieCard>>> {
    let num = validate_num(params.num, state.defaults.num_recommendations)?;
    let alpha = params.alpha.unwrap_or(state.defaults.hybrid_alpha);

    let scored = best_effort(
        state
            .recommender
            .hybrid_recommendations(&params.user_id, &params.movie_id, alpha, num)
            .await,
        "hybrid_recommendations",
    )?
    .into_iter()
    .map(|rec| (rec.movie, rec.score))
    .collect();

    Ok(Json(build_cards(&state, scored).await))
}
