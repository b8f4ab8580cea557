use std::sync::Arc;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{lenient, poster_url, Movie, MovieSearchResult},
    services::{
        scoring::GlobalStats,
        search_engine::{queries, SearchEngine},
    },
};

/// Read access to the movie and user indices
///
/// Backs the browse side of the service: full-text movie search, the list of
/// known users, single movie lookups, and the catalog statistics the
/// weighted rating needs.
#[derive(Clone)]
pub struct Catalog {
    engine: Arc<dyn SearchEngine>,
    movies_index: String,
    users_index: String,
    image_base_url: String,
}

impl Catalog {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        movies_index: String,
        users_index: String,
        image_base_url: String,
    ) -> Self {
        Self {
            engine,
            movies_index,
            users_index,
            image_base_url,
        }
    }

    pub fn from_config(engine: Arc<dyn SearchEngine>, config: &Config) -> Self {
        Self::new(
            engine,
            config.movies_index.clone(),
            config.users_index.clone(),
            config.tmdb_image_url.clone(),
        )
    }

    pub fn image_base_url(&self) -> &str {
        &self.image_base_url
    }

    /// Full-text search over titles and descriptions
    pub async fn search_movies(&self, query: &str, limit: usize) -> AppResult<Vec<MovieSearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let response = self
            .engine
            .search(&self.movies_index, queries::multi_match_query(query, limit))
            .await?;

        let results: Vec<MovieSearchResult> = response
            .into_hits()
            .into_iter()
            .map(|hit| {
                let movie = Movie::from_source(&hit.id, &hit.source);
                let poster_url = poster_url(&self.image_base_url, movie.poster_path.as_deref());
                MovieSearchResult {
                    movie,
                    score: hit.score.unwrap_or(0.0),
                    poster_url,
                }
            })
            .collect();

        tracing::info!(
            query = %query,
            results = results.len(),
            engine = self.engine.name(),
            "Movie search completed"
        );

        Ok(results)
    }

    /// Ids of documents in the users index
    pub async fn list_user_ids(&self, limit: usize) -> AppResult<Vec<String>> {
        let response = self
            .engine
            .search(&self.users_index, queries::user_ids_query(limit))
            .await?;

        Ok(response.into_hits().into_iter().map(|hit| hit.id).collect())
    }

    /// A single movie document by id
    pub async fn get_movie(&self, movie_id: &str) -> AppResult<Movie> {
        let source = self
            .engine
            .get_document(&self.movies_index, movie_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))?;

        Ok(Movie::from_source(movie_id, &source))
    }

    /// Mean vote, minimum-votes prior, and maximum popularity over the catalog
    pub async fn global_stats(&self, min_votes_percentile: f64) -> AppResult<GlobalStats> {
        let response = self
            .engine
            .search(
                &self.movies_index,
                queries::global_stats_query(min_votes_percentile),
            )
            .await?;

        let stats = GlobalStats::from_response(&response);

        tracing::info!(
            mean_vote = stats.mean_vote,
            min_votes = stats.min_votes,
            max_popularity = stats.max_popularity,
            "Computed catalog statistics"
        );

        Ok(stats)
    }

    /// Every movie id in the catalog along with its raw popularity
    pub async fn popularity_by_movie(&self, size: usize) -> AppResult<Vec<(String, f64)>> {
        let response = self
            .engine
            .search(&self.movies_index, queries::match_all_query(size))
            .await?;

        Ok(response
            .into_hits()
            .into_iter()
            .map(|hit| {
                let movie = Movie::from_source(&hit.id, &hit.source);
                (movie.movie_id, movie.popularity)
            })
            .collect())
    }
}

/// Reads the bucket keys of a terms aggregation as ids
pub(crate) fn bucket_keys(aggregation: Option<&serde_json::Value>) -> Vec<String> {
    aggregation
        .and_then(|agg| agg.get("buckets"))
        .and_then(serde_json::Value::as_array)
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| bucket.get("key").and_then(lenient::id_to_string))
                .collect()
        })
        .unwrap_or_default()
}
