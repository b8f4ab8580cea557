/// Movie metadata provider abstraction
///
/// Detail pages and recommendation cards are decorated with metadata from an
/// external movie database (TMDB). Providers are looked up by the catalog's
/// movie id.
use crate::{error::AppResult, models::MovieDetails};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch details for one movie
    async fn fetch_movie_details(&self, movie_id: &str) -> AppResult<MovieDetails>;

    /// Fetch details for several movies in parallel
    ///
    /// Results are returned in input order. A failed lookup is logged and
    /// yields `None` in its slot rather than failing the batch.
    async fn fetch_details_batch(&self, movie_ids: Vec<String>) -> Vec<Option<MovieDetails>> {
        let mut tasks = Vec::new();

        for movie_id in movie_ids {
            let provider = self.clone_for_task();
            let task = tokio::spawn(async move {
                let result = provider.fetch_movie_details(&movie_id).await;
                (movie_id, result)
            });
            tasks.push(task);
        }

        let mut results = Vec::with_capacity(tasks.len());
        let mut failures = 0usize;

        for task in tasks {
            match task.await {
                Ok((_, Ok(details))) => results.push(Some(details)),
                Ok((movie_id, Err(e))) => {
                    tracing::warn!(movie_id = %movie_id, error = %e, "Metadata fetch failed");
                    failures += 1;
                    results.push(None);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    failures += 1;
                    results.push(None);
                }
            }
        }

        if failures > 0 {
            tracing::warn!(
                success_count = results.len() - failures,
                error_count = failures,
                provider = self.name(),
                "Partial metadata fetch failure"
            );
        }

        results
    }

    /// Clone provider for parallel task execution
    fn clone_for_task(&self) -> Box<dyn MetadataProvider>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
