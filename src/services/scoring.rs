use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::{
    config::Config,
    models::{Movie, Recommendation},
    services::search_engine::{SearchHit, SearchResponse},
};

/// Catalog-wide statistics used as the weighted rating prior
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Mean `vote_average` across the catalog (C)
    pub mean_vote: f64,
    /// `vote_count` at the configured percentile (m)
    pub min_votes: f64,
    /// Largest `popularity` in the catalog (P_max)
    pub max_popularity: f64,
}

impl GlobalStats {
    /// Reads the stats out of a `global_stats_query` response.
    ///
    /// Aggregations over an empty index come back as `null`; those read as zero.
    pub fn from_response(response: &SearchResponse) -> Self {
        let value_of = |name: &str| {
            response
                .aggregation(name)
                .and_then(|agg| agg.get("value"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };

        // Percentile keys are rendered as "65.0"; there is only ever one.
        let min_votes = response
            .aggregation("min_votes")
            .and_then(|agg| agg.get("values"))
            .and_then(Value::as_object)
            .and_then(|values| values.values().next())
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        Self {
            mean_vote: value_of("avg_vote"),
            min_votes,
            max_popularity: value_of("max_popularity"),
        }
    }
}

/// Bayesian-average rating with popularity and recency boosts.
///
/// `score = v/(v+m)·R + m/(v+m)·C + λp·P/P_max + λr·recency`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedRating {
    pub stats: GlobalStats,
    pub popularity_weight: f64,
    pub recency_weight: f64,
    pub recency_horizon_years: f64,
    /// Year that counts as fully recent
    pub reference_year: i32,
}

impl WeightedRating {
    pub fn new(stats: GlobalStats, popularity_weight: f64) -> Self {
        Self {
            stats,
            popularity_weight,
            recency_weight: 0.0,
            recency_horizon_years: 30.0,
            reference_year: chrono::Datelike::year(&chrono::Utc::now()),
        }
    }

    pub fn from_config(stats: GlobalStats, config: &Config) -> Self {
        Self::new(stats, config.lambda_popularity)
            .with_recency(config.lambda_recency, config.recency_horizon_years)
    }

    pub fn with_recency(mut self, weight: f64, horizon_years: f64) -> Self {
        self.recency_weight = weight;
        self.recency_horizon_years = horizon_years;
        self
    }

    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Scores a movie from its vote count `v`, average rating `r`,
    /// popularity `p`, and release year
    pub fn score(&self, v: u64, r: f64, p: f64, release_year: Option<i32>) -> f64 {
        let GlobalStats {
            mean_vote: c,
            min_votes: m,
            max_popularity: p_max,
        } = self.stats;

        let popularity = if p_max != 0.0 {
            self.popularity_weight * (p / p_max)
        } else {
            0.0
        };

        let base = if v > 0 {
            let v = v as f64;
            (v / (v + m)) * r + (m / (v + m)) * c + popularity
        } else {
            popularity
        };

        base + self.recency_bonus(release_year)
    }

    fn recency_bonus(&self, release_year: Option<i32>) -> f64 {
        match release_year {
            Some(year) if self.recency_weight != 0.0 && self.recency_horizon_years > 0.0 => {
                let age = (self.reference_year - year) as f64;
                let freshness = (1.0 - age / self.recency_horizon_years).clamp(0.0, 1.0);
                self.recency_weight * freshness
            }
            _ => 0.0,
        }
    }

    pub fn score_movie(&self, movie: &Movie) -> f64 {
        self.score(
            movie.vote_count,
            movie.vote_average,
            movie.popularity,
            movie.release_year,
        )
    }
}

/// Scores every hit and orders them by weighted rating, highest first.
///
/// The engine's relevance score is kept as `original_score`.
pub fn rank_hits(hits: Vec<SearchHit>, model: &WeightedRating) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = hits
        .into_iter()
        .map(|hit| {
            let movie = Movie::from_source(&hit.id, &hit.source);
            let weighted_rating = model.score_movie(&movie);
            Recommendation {
                movie,
                weighted_rating,
                original_score: hit.score.unwrap_or(0.0),
            }
        })
        .collect();

    recommendations.sort_by(|a, b| {
        b.weighted_rating
            .partial_cmp(&a.weighted_rating)
            .unwrap_or(Ordering::Equal)
    });

    recommendations
}
