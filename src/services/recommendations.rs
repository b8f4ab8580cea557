use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{vector_from_source, Movie, Recommendation, ScoredMovie},
    services::{
        scoring::{rank_hits, WeightedRating},
        search_engine::{queries, SearchEngine, Similarity},
    },
};

/// Index and field names the recommender reads from
#[derive(Debug, Clone)]
pub struct RecommenderSettings {
    pub movies_index: String,
    pub users_index: String,
    /// Collaborative factor present on users and movies
    pub user_vector_field: String,
    /// Metadata embedding present on movies
    pub content_vector_field: String,
    pub content_similarity: Similarity,
    /// Query string restricting candidate movies
    pub candidate_filter: String,
}

impl RecommenderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            movies_index: config.movies_index.clone(),
            users_index: config.users_index.clone(),
            user_vector_field: config.user_vector_field.clone(),
            content_vector_field: config.content_vector_field.clone(),
            content_similarity: config.content_similarity,
            candidate_filter: "*".to_string(),
        }
    }
}

/// Generates content-based, user-based, and hybrid recommendations
///
/// Candidates come from script-scored vector queries; they are then
/// re-ordered by the weighted rating before truncation.
#[derive(Clone)]
pub struct Recommender {
    engine: Arc<dyn SearchEngine>,
    model: WeightedRating,
    settings: RecommenderSettings,
}

impl Recommender {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        model: WeightedRating,
        settings: RecommenderSettings,
    ) -> Self {
        Self {
            engine,
            model,
            settings,
        }
    }

    pub fn model(&self) -> &WeightedRating {
        &self.model
    }

    /// Reads `field` off a document, treating a missing document or vector as absent
    async fn fetch_vector(&self, index: &str, id: &str, field: &str) -> AppResult<Option<Vec<f64>>> {
        let Some(source) = self.engine.get_document(index, id).await? else {
            tracing::info!(index = %index, id = %id, "Seed document not found");
            return Ok(None);
        };

        let vector = vector_from_source(&source, field);
        if vector.is_none() {
            tracing::info!(index = %index, id = %id, field = %field, "Seed document has no vector");
        }

        Ok(vector)
    }

    async fn rank_by_vector(
        &self,
        vector: &[f64],
        field: &str,
        similarity: Similarity,
        size: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let body = queries::vector_query(
            vector,
            field,
            &self.settings.candidate_filter,
            similarity,
            size,
        );

        let response = self.engine.search(&self.settings.movies_index, body).await?;
        Ok(rank_hits(response.into_hits(), &self.model))
    }

    /// Movies closest to `movie_id` in metadata-embedding space
    ///
    /// The seed itself is never returned.
    pub async fn similar_movies(&self, movie_id: &str, num: usize) -> AppResult<Vec<Recommendation>> {
        let field = &self.settings.content_vector_field;
        let Some(vector) = self
            .fetch_vector(&self.settings.movies_index, movie_id, field)
            .await?
        else {
            return Ok(Vec::new());
        };

        // One extra candidate because the seed usually matches itself
        let mut recommendations = self
            .rank_by_vector(&vector, field, self.settings.content_similarity, num.saturating_add(1))
            .await?;

        recommendations.retain(|rec| rec.movie.movie_id != movie_id);
        recommendations.truncate(num);

        tracing::info!(
            movie_id = %movie_id,
            results = recommendations.len(),
            "Similar movies computed"
        );

        Ok(recommendations)
    }

    /// Movies matching the user's collaborative factor
    pub async fn user_recommendations(
        &self,
        user_id: &str,
        num: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let field = &self.settings.user_vector_field;
        let Some(vector) = self
            .fetch_vector(&self.settings.users_index, user_id, field)
            .await?
        else {
            return Ok(Vec::new());
        };

        let mut recommendations = self
            .rank_by_vector(&vector, field, Similarity::DotProduct, num)
            .await?;
        recommendations.truncate(num);

        tracing::info!(
            user_id = %user_id,
            results = recommendations.len(),
            "User recommendations computed"
        );

        Ok(recommendations)
    }

    /// Blends user-based and content-based candidates
    ///
    /// Each side contributes `2 * num` candidates scored by the engine's
    /// relevance. A side that fails is logged and contributes nothing.
    pub async fn hybrid_recommendations(
        &self,
        user_id: &str,
        movie_id: &str,
        alpha: f64,
        num: usize,
    ) -> AppResult<Vec<ScoredMovie>> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(AppError::InvalidInput(format!(
                "alpha must be within [0, 1], got {}",
                alpha
            )));
        }

        let candidates = num.saturating_mul(2);
        let (user_side, content_side) = tokio::join!(
            self.user_recommendations(user_id, candidates),
            self.similar_movies(movie_id, candidates),
        );

        let user_recs = user_side.unwrap_or_else(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "User-based candidates unavailable");
            Vec::new()
        });
        let content_recs = content_side.unwrap_or_else(|e| {
            tracing::warn!(movie_id = %movie_id, error = %e, "Content-based candidates unavailable");
            Vec::new()
        });

        let mut movies: HashMap<String, Movie> = HashMap::new();
        let user_scores = score_map(user_recs, &mut movies);
        let content_scores = score_map(content_recs, &mut movies);

        let mut blended = blend_scores(&user_scores, &content_scores, alpha, movie_id);
        blended.truncate(num);

        let recommendations: Vec<ScoredMovie> = blended
            .into_iter()
            .filter_map(|(id, score)| {
                movies.remove(&id).map(|movie| ScoredMovie { movie, score })
            })
            .collect();

        tracing::info!(
            user_id = %user_id,
            movie_id = %movie_id,
            alpha = alpha,
            user_candidates = user_scores.len(),
            content_candidates = content_scores.len(),
            results = recommendations.len(),
            "Hybrid recommendations computed"
        );

        Ok(recommendations)
    }
}

/// Collects `movie_id → original_score`, stashing each movie for later
fn score_map(recs: Vec<Recommendation>, movies: &mut HashMap<String, Movie>) -> HashMap<String, f64> {
    let mut scores = HashMap::with_capacity(recs.len());
    for rec in recs {
        scores.insert(rec.movie.movie_id.clone(), rec.original_score);
        movies.entry(rec.movie.movie_id.clone()).or_insert(rec.movie);
    }
    scores
}

/// Convex combination of two score maps.
///
/// Every id in either map except `seed` gets
/// `alpha * user + (1 - alpha) * content`, a missing side counting as zero.
/// Sorted by score descending, ties by id (numerically when both ids are numbers).
pub fn blend_scores(
    user_scores: &HashMap<String, f64>,
    content_scores: &HashMap<String, f64>,
    alpha: f64,
    seed: &str,
) -> Vec<(String, f64)> {
    let ids: HashSet<&String> = user_scores.keys().chain(content_scores.keys()).collect();

    let mut blended: Vec<(String, f64)> = ids
        .into_iter()
        .filter(|id| id.as_str() != seed)
        .map(|id| {
            let user = user_scores.get(id).copied().unwrap_or(0.0);
            let content = content_scores.get(id).copied().unwrap_or(0.0);
            (id.clone(), alpha * user + (1.0 - alpha) * content)
        })
        .collect();

    blended.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| compare_ids(&a.0, &b.0))
    });

    blended
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}
