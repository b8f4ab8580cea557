use serde::Deserialize;

use crate::routes::MAX_NUM;
use crate::services::search_engine::Similarity;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Elasticsearch base URL
    #[serde(default = "default_elasticsearch_url")]
    pub elasticsearch_url: String,

    #[serde(default)]
    pub elasticsearch_username: Option<String>,

    #[serde(default)]
    pub elasticsearch_password: Option<String>,

    #[serde(default = "default_movies_index")]
    pub movies_index: String,

    #[serde(default = "default_users_index")]
    pub users_index: String,

    #[serde(default = "default_ratings_index")]
    pub ratings_index: String,

    /// Collaborative-filtering factor stored on both users and movies
    #[serde(default = "default_user_vector_field")]
    pub user_vector_field: String,

    /// Metadata embedding stored on movies
    #[serde(default = "default_content_vector_field")]
    pub content_vector_field: String,

    /// Script used to score content similarity
    #[serde(default)]
    pub content_similarity: Similarity,

    /// TMDB read-access token
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// Older name for the TMDB token, used when `TMDB_API_KEY` is unset
    #[serde(default, rename = "api_key")]
    legacy_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with a poster path to build an image URL
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Redis connection URL; metadata caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Weight of normalised popularity in the weighted rating
    #[serde(default = "default_lambda_popularity")]
    pub lambda_popularity: f64,

    /// Weight of release recency in the weighted rating
    #[serde(default)]
    pub lambda_recency: f64,

    #[serde(default = "default_recency_horizon_years")]
    pub recency_horizon_years: f64,

    /// Percentile of `vote_count` used as the minimum-votes prior
    #[serde(default = "default_min_votes_percentile")]
    pub min_votes_percentile: f64,

    /// Share of the user-based score in hybrid recommendations
    #[serde(default = "default_hybrid_alpha")]
    pub hybrid_alpha: f64,

    #[serde(default = "default_num_recommendations")]
    pub num_recommendations: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_elasticsearch_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_movies_index() -> String {
    "movies".to_string()
}

fn default_users_index() -> String {
    "users".to_string()
}

fn default_ratings_index() -> String {
    "ratings".to_string()
}

fn default_user_vector_field() -> String {
    "model_factor".to_string()
}

fn default_content_vector_field() -> String {
    "meta_factor".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_lambda_popularity() -> f64 {
    0.6
}

fn default_recency_horizon_years() -> f64 {
    30.0
}

fn default_min_votes_percentile() -> f64 {
    65.0
}

fn default_hybrid_alpha() -> f64 {
    0.5
}

fn default_num_recommendations() -> usize {
    10
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        if config.tmdb_api_key.is_none() {
            config.tmdb_api_key = config.legacy_api_key.take();
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.hybrid_alpha) {
            anyhow::bail!("HYBRID_ALPHA must be within [0, 1], got {}", self.hybrid_alpha);
        }
        if !(0.0..=100.0).contains(&self.min_votes_percentile) {
            anyhow::bail!(
                "MIN_VOTES_PERCENTILE must be within [0, 100], got {}",
                self.min_votes_percentile
            );
        }
        if !(1..=MAX_NUM).contains(&self.num_recommendations) {
            anyhow::bail!(
                "NUM_RECOMMENDATIONS must be within [1, {}], got {}",
                MAX_NUM,
                self.num_recommendations
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
