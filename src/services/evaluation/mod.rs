//! Offline evaluation of the hybrid recommender.
//!
//! Active raters from the ratings index act as test users. Each user's
//! highly rated movies are the ground truth, and the first of them seeds a
//! hybrid request. The resulting lists are scored with the functions in
//! [`metrics`].

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::lenient,
    services::{
        catalog::{bucket_keys, Catalog},
        recommendations::Recommender,
        search_engine::{queries, SearchEngine},
    },
};

pub mod metrics;

#[derive(Debug, Clone)]
pub struct EvaluationSettings {
    pub ratings_index: String,
    /// Minimum ratings for a user to qualify as a test user
    pub min_ratings: u64,
    /// Ratings at or above this count as liked
    pub like_threshold: f64,
    /// Upper bound on candidate users read from the aggregation
    pub max_candidate_users: usize,
    /// Liked items read per user
    pub items_per_user: usize,
    /// Movies read to build the catalog
    pub catalog_size: usize,
}

impl EvaluationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ratings_index: config.ratings_index.clone(),
            ..Self::default()
        }
    }
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            ratings_index: "ratings".to_string(),
            min_ratings: 10,
            like_threshold: 3.5,
            max_candidate_users: 1000,
            items_per_user: 10,
            catalog_size: 10_000,
        }
    }
}

/// Aggregate metrics over every evaluated user
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub coverage: f64,
    pub diversity: f64,
    pub novelty: f64,
    pub precision: f64,
    pub recall: f64,
    /// Users that produced a recommendation list
    pub evaluated_users: usize,
}

impl EvaluationReport {
    /// Metric values in display order
    pub fn metrics(&self) -> [(&'static str, f64); 5] {
        [
            ("Coverage", self.coverage),
            ("Diversity", self.diversity),
            ("Novelty", self.novelty),
            ("Precision", self.precision),
            ("Recall", self.recall),
        ]
    }
}

pub struct Evaluator {
    engine: Arc<dyn SearchEngine>,
    catalog: Catalog,
    recommender: Recommender,
    settings: EvaluationSettings,
}

impl Evaluator {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        catalog: Catalog,
        recommender: Recommender,
        settings: EvaluationSettings,
    ) -> Self {
        Self {
            engine,
            catalog,
            recommender,
            settings,
        }
    }

    /// Ids of users with enough ratings, in aggregation order
    pub async fn test_users(&self, limit: usize) -> AppResult<Vec<String>> {
        let body = queries::active_users_query(
            self.settings.min_ratings,
            self.settings.max_candidate_users,
        );
        let response = self.engine.search(&self.settings.ratings_index, body).await?;

        let mut users = bucket_keys(response.aggregation("user_ratings"));
        users.truncate(limit);
        Ok(users)
    }

    /// Movies the user rated at or above the like threshold
    pub async fn user_test_items(&self, user_id: &str) -> AppResult<Vec<String>> {
        let body = queries::liked_items_query(
            user_id,
            self.settings.like_threshold,
            self.settings.items_per_user,
        );
        let response = self.engine.search(&self.settings.ratings_index, body).await?;

        Ok(response
            .hits()
            .iter()
            .filter_map(|hit| hit.source.get("movieId").and_then(lenient::id_to_string))
            .collect())
    }

    /// Movie ids with popularity scaled by the catalog maximum
    async fn normalised_popularity(&self) -> AppResult<(Vec<String>, HashMap<String, f64>)> {
        let movies = self
            .catalog
            .popularity_by_movie(self.settings.catalog_size)
            .await?;

        let max_popularity = movies.iter().map(|(_, p)| *p).fold(0.0_f64, f64::max);
        let movie_ids = movies.iter().map(|(id, _)| id.clone()).collect();
        let popularity = movies
            .into_iter()
            .map(|(id, p)| {
                let normalised = if max_popularity > 0.0 { p / max_popularity } else { 0.0 };
                (id, normalised)
            })
            .collect();

        Ok((movie_ids, popularity))
    }

    /// Runs hybrid recommendations for up to `test_users` users and scores them
    pub async fn run(&self, k: usize, test_users: usize, alpha: f64) -> AppResult<EvaluationReport> {
        let users = self.test_users(test_users).await?;
        let (movie_ids, popularity) = self.normalised_popularity().await?;

        tracing::info!(
            users = users.len(),
            catalog_size = movie_ids.len(),
            k = k,
            "Starting evaluation"
        );

        let mut recommendations: HashMap<String, Vec<String>> = HashMap::new();
        let mut relevant: HashMap<String, HashSet<String>> = HashMap::new();

        for user_id in users {
            let test_items = match self.user_test_items(&user_id).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(user_id = %user_id, error = %e, "Failed to read liked items");
                    continue;
                }
            };

            let Some(seed) = test_items.first() else {
                continue;
            };

            let recs = match self
                .recommender
                .hybrid_recommendations(&user_id, seed, alpha, k)
                .await
            {
                Ok(recs) => recs,
                Err(e) => {
                    tracing::warn!(user_id = %user_id, error = %e, "Hybrid recommendations failed");
                    continue;
                }
            };

            if recs.is_empty() {
                continue;
            }

            recommendations.insert(
                user_id.clone(),
                recs.into_iter().map(|r| r.movie.movie_id).collect(),
            );
            relevant.insert(user_id, test_items.into_iter().collect());
        }

        if recommendations.is_empty() {
            return Err(AppError::Evaluation(
                "No recommendations generated".to_string(),
            ));
        }

        let (precision, recall) = metrics::precision_recall(&recommendations, &relevant);
        let report = EvaluationReport {
            coverage: metrics::coverage(&recommendations, &movie_ids),
            diversity: metrics::diversity(&recommendations),
            novelty: metrics::novelty(&recommendations, &popularity),
            precision,
            recall,
            evaluated_users: recommendations.len(),
        };

        tracing::info!(
            evaluated_users = report.evaluated_users,
            coverage = report.coverage,
            precision = report.precision,
            recall = report.recall,
            "Evaluation finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        recommendations::RecommenderSettings,
        scoring::{GlobalStats, WeightedRating},
        search_engine::{MockSearchEngine, SearchHit, SearchResponse, Similarity},
    };
    use serde_json::{json, Value};

    fn evaluator(engine: MockSearchEngine) -> Evaluator {
        let engine: Arc<dyn SearchEngine> = Arc::new(engine);
        let catalog = Catalog::new(
            engine.clone(),
            "movies".to_string(),
            "users".to_string(),
            String::new(),
        );
        let recommender = Recommender::new(
            engine.clone(),
            WeightedRating::new(GlobalStats::default(), 0.6),
            RecommenderSettings {
                movies_index: "movies".to_string(),
                users_index: "users".to_string(),
                user_vector_field: "model_factor".to_string(),
                content_vector_field: "meta_factor".to_string(),
                content_similarity: Similarity::DotProduct,
                candidate_filter: "*".to_string(),
            },
        );
        Evaluator::new(engine, catalog, recommender, EvaluationSettings::default())
    }

    fn hit(id: &str, score: f64, source: Value) -> SearchHit {
        SearchHit {
            id: id.to_string(),
            score: Some(score),
            source,
        }
    }

    #[tokio::test]
    async fn test_test_users_truncates_buckets() {
        let mut engine = MockSearchEngine::new();
        engine
            .expect_search()
            .withf(|index, body| {
                index == "ratings" && body["aggs"]["user_ratings"]["terms"]["min_doc_count"] == 10
            })
            .returning(|_, _| {
                Ok(serde_json::from_value(json!({
                    "aggregations": {
                        "user_ratings": { "buckets": [ { "key": 1 }, { "key": 2 }, { "key": 3 } ] }
                    }
                }))
                .unwrap())
            });

        let users = evaluator(engine).test_users(2).await.unwrap();
        assert_eq!(users, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_user_test_items_reads_movie_ids() {
        let mut engine = MockSearchEngine::new();
        engine.expect_search().returning(|_, _| {
            Ok(SearchResponse::from_hits(vec![
                hit("r1", 1.0, json!({ "userId": 4, "movieId": 31, "rating": 4.0 })),
                hit("r2", 1.0, json!({ "userId": 4, "movieId": 1029, "rating": 5.0 })),
                hit("r3", 1.0, json!({ "userId": 4 })),
            ]))
        });

        let items = evaluator(engine).user_test_items("4").await.unwrap();
        assert_eq!(items, vec!["31", "1029"]);
    }

    #[tokio::test]
    async fn test_run_without_recommendations_is_an_error() {
        let mut engine = MockSearchEngine::new();
        engine.expect_search().returning(|index, body| {
            if index == "ratings" && body.get("aggs").is_some() {
                return Ok(serde_json::from_value(json!({
                    "aggregations": { "user_ratings": { "buckets": [ { "key": 1 } ] } }
                }))
                .unwrap());
            }
            Ok(SearchResponse::default())
        });

        let result = evaluator(engine).run(10, 100, 0.5).await;
        assert!(matches!(result, Err(AppError::Evaluation(_))));
    }

    #[tokio::test]
    async fn test_run_scores_generated_lists() {
        let mut engine = MockSearchEngine::new();
        engine.expect_get_document().returning(|index, _| {
            Ok(Some(match index {
                "users" => json!({ "model_factor": [1.0] }),
                _ => json!({ "meta_factor": [1.0] }),
            }))
        });
        engine.expect_search().returning(|index, body| {
            if index == "ratings" && body.get("aggs").is_some() {
                return Ok(serde_json::from_value(json!({
                    "aggregations": { "user_ratings": { "buckets": [ { "key": 1 } ] } }
                }))
                .unwrap());
            }
            if index == "ratings" {
                return Ok(SearchResponse::from_hits(vec![
                    hit("r1", 1.0, json!({ "movieId": 10 })),
                    hit("r2", 1.0, json!({ "movieId": 20 })),
                ]));
            }
            if body["query"].get("match_all").is_some() {
                return Ok(SearchResponse::from_hits(vec![
                    hit("10", 1.0, json!({ "movieId": 10, "popularity": 100.0 })),
                    hit("20", 1.0, json!({ "movieId": 20, "popularity": 50.0 })),
                    hit("30", 1.0, json!({ "movieId": 30, "popularity": 25.0 })),
                    hit("40", 1.0, json!({ "movieId": 40, "popularity": 0.0 })),
                ]));
            }
            Ok(SearchResponse::from_hits(vec![
                hit("20", 0.9, json!({ "movieId": 20 })),
                hit("30", 0.5, json!({ "movieId": 30 })),
            ]))
        });

        let report = evaluator(engine).run(10, 100, 0.5).await.unwrap();

        assert_eq!(report.evaluated_users, 1);
        assert_eq!(report.coverage, 0.5);
        assert_eq!(report.diversity, 0.0);
        // -log2(0.5) and -log2(0.25)
        assert!((report.novelty - 1.5).abs() < 1e-12);
        assert_eq!(report.precision, 0.5);
        assert_eq!(report.recall, 0.5);
    }

    #[test]
    fn test_report_metric_order() {
        let report = EvaluationReport {
            coverage: 0.1,
            diversity: 0.2,
            novelty: 0.3,
            precision: 0.4,
            recall: 0.5,
            evaluated_users: 3,
        };
        let names: Vec<&str> = report.metrics().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["Coverage", "Diversity", "Novelty", "Precision", "Recall"]);
    }
}
