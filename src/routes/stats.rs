use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use super::AppState;
use crate::services::GlobalStats;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: GlobalStats,
    pub popularity_weight: f64,
    pub recency_weight: f64,
    pub reference_year: i32,
}

/// Parameters of the weighted rating in use
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let model = state.recommender.model();
    Json(StatsResponse {
        stats: model.stats,
        popularity_weight: model.popularity_weight,
        recency_weight: model.recency_weight,
        reference_year: model.reference_year,
    })
}
