/// TMDB API provider
///
/// Detail lookups go to `GET /3/movie/{id}?language=..` with a bearer token.
/// Responses are cached for a day when a cache is configured.
use crate::{
    cache::{Cache, CacheKey},
    cached,
    config::Config,
    error::{AppError, AppResult},
    models::{MovieDetails, TmdbError},
    services::providers::MetadataProvider,
};
use chrono::Utc;
use reqwest::{header, Client as HttpClient, StatusCode};
use std::time::Duration;

const DETAILS_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    language: String,
    cache: Option<Cache>,
}

impl TmdbProvider {
    pub fn new(
        cache: Option<Cache>,
        api_key: Option<String>,
        api_url: String,
        language: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        if api_key.is_none() {
            tracing::warn!("No TMDB API key configured; detail lookups will be rejected");
        }

        Ok(Self {
            http_client: HttpClient::builder().timeout(timeout).build()?,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
            cache,
        })
    }

    pub fn from_config(config: &Config, cache: Option<Cache>) -> AppResult<Self> {
        Self::new(
            cache,
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_language.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn validate_movie_id(movie_id: &str) -> AppResult<u64> {
        movie_id.trim().parse::<u64>().map_err(|_| {
            AppError::InvalidInput(format!("TMDB movie ids are numeric, got '{}'", movie_id))
        })
    }

    async fn request_details(&self, id: u64) -> AppResult<MovieDetails> {
        let url = format!("{}/3/movie/{}", self.api_url, id);

        let mut request = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .query(&[("language", self.language.as_str())]);

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TmdbError>(&body)
                .ok()
                .and_then(|e| e.status_message)
                .unwrap_or(body);

            if status == StatusCode::UNAUTHORIZED {
                tracing::error!(movie_id = id, message = %message, "TMDB rejected the API key");
            }

            return match status {
                StatusCode::NOT_FOUND => Err(AppError::NotFound(format!(
                    "TMDB has no movie {}: {}",
                    id, message
                ))),
                _ => Err(AppError::ExternalApi(format!(
                    "TMDB API returned status {}: {}",
                    status, message
                ))),
            };
        }

        let mut details: MovieDetails = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })?;
        details.fetched_at = Utc::now();

        tracing::info!(
            movie_id = id,
            title = %details.title,
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(details)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_movie_details(&self, movie_id: &str) -> AppResult<MovieDetails> {
        let id = Self::validate_movie_id(movie_id)?;

        cached!(
            self.cache,
            CacheKey::MovieDetails(id.to_string(), self.language.clone()),
            DETAILS_CACHE_TTL,
            self.request_details(id)
        )
    }

    fn clone_for_task(&self) -> Box<dyn MetadataProvider> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
