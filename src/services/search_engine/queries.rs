//! Request bodies for the search engine's `_search` endpoint.

use serde_json::{json, Value};

use super::Similarity;

/// Painless source scoring `field` against `params.vector`.
///
/// Documents without the field score zero.
pub fn score_script(field: &str, similarity: Similarity) -> String {
    match similarity {
        Similarity::Cosine => format!(
            "doc['{f}'].size() == 0 ? 0 : cosineSimilarity(params.vector, '{f}') + 1.0",
            f = field
        ),
        Similarity::DotProduct => format!(
            "doc['{f}'].size() == 0 ? 0 : sigmoid(1, Math.E, -dotProduct(params.vector, '{f}'))",
            f = field
        ),
    }
}

/// Scores documents matching `q` by vector similarity
pub fn vector_query(
    vector: &[f64],
    field: &str,
    q: &str,
    similarity: Similarity,
    size: usize,
) -> Value {
    json!({
        "size": size,
        "query": {
            "script_score": {
                "query": {
                    "query_string": {
                        "query": q
                    }
                },
                "script": {
                    "source": score_script(field, similarity),
                    "params": {
                        "vector": vector
                    }
                }
            }
        }
    })
}

/// Full-text search over titles and descriptions, titles boosted
pub fn multi_match_query(text: &str, size: usize) -> Value {
    json!({
        "size": size,
        "query": {
            "multi_match": {
                "query": text,
                "fields": ["title^3", "description"]
            }
        }
    })
}

/// Aggregations feeding the weighted rating prior
pub fn global_stats_query(min_votes_percentile: f64) -> Value {
    json!({
        "size": 0,
        "aggs": {
            "avg_vote": { "avg": { "field": "vote_average" } },
            "min_votes": {
                "percentiles": {
                    "field": "vote_count",
                    "percents": [min_votes_percentile]
                }
            },
            "max_popularity": { "max": { "field": "popularity" } }
        }
    })
}

/// Every document carrying a `userId`
pub fn user_ids_query(size: usize) -> Value {
    json!({
        "size": size,
        "_source": false,
        "query": {
            "query_string": {
                "query": "userId:*"
            }
        }
    })
}

/// Users with at least `min_ratings` ratings
pub fn active_users_query(min_ratings: u64, size: usize) -> Value {
    json!({
        "size": 0,
        "aggs": {
            "user_ratings": {
                "terms": {
                    "field": "userId",
                    "min_doc_count": min_ratings,
                    "size": size
                }
            }
        }
    })
}

/// Ratings by `user_id` at or above `threshold`
pub fn liked_items_query(user_id: &str, threshold: f64, size: usize) -> Value {
    json!({
        "size": size,
        "query": {
            "bool": {
                "must": [
                    { "term": { "userId": user_id } },
                    { "range": { "rating": { "gte": threshold } } }
                ]
            }
        }
    })
}

pub fn match_all_query(size: usize) -> Value {
    json!({
        "size": size,
        "query": { "match_all": {} }
    })
}
