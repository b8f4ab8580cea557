pub mod catalog;
pub mod evaluation;
pub mod providers;
pub mod recommendations;
pub mod scoring;
pub mod search_engine;

pub use catalog::Catalog;
pub use evaluation::{EvaluationReport, EvaluationSettings, Evaluator};
pub use providers::{MetadataProvider, TmdbProvider};
pub use recommendations::{blend_scores, Recommender, RecommenderSettings};
pub use scoring::{GlobalStats, WeightedRating};
pub use search_engine::{ElasticsearchClient, SearchEngine, Similarity};
