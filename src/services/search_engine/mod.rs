/// Search engine abstraction
///
/// Movies, users and ratings live in a document search engine that is reached
/// over its REST interface. Everything the recommender needs is a document
/// lookup by id or a search request with a JSON body; the bodies are built in
/// [`queries`].
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;

pub mod elasticsearch;
pub mod queries;

pub use elasticsearch::ElasticsearchClient;

/// Script used to score a stored vector against a query vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    /// `sigmoid(1, e, -dot(q, d))`
    #[default]
    DotProduct,
    /// `cosine(q, d) + 1`
    Cosine,
}

/// A single hit from a search response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// Body of a `_search` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: HitsEnvelope,
    #[serde(default)]
    pub aggregations: Option<Value>,
}

impl SearchResponse {
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits: HitsEnvelope { hits },
            aggregations: None,
        }
    }

    pub fn hits(&self) -> &[SearchHit] {
        &self.hits.hits
    }

    pub fn into_hits(self) -> Vec<SearchHit> {
        self.hits.hits
    }

    /// Returns the named aggregation, if present
    pub fn aggregation(&self, name: &str) -> Option<&Value> {
        self.aggregations.as_ref()?.get(name)
    }
}

/// Trait for document search engines
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchEngine: Send + Sync {
    /// Fetch a document's source by id
    ///
    /// Returns `None` when the document does not exist.
    async fn get_document(&self, index: &str, id: &str) -> AppResult<Option<Value>>;

    /// Run a search request against an index
    async fn search(&self, index: &str, body: Value) -> AppResult<SearchResponse>;

    /// Engine name for logging and debugging
    fn name(&self) -> &'static str;
}
