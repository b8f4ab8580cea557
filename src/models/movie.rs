use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// A movie document from the search engine.
///
/// Missing or malformed numeric fields decode to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    #[serde(
        rename(serialize = "movie_id", deserialize = "movieId"),
        default,
        deserialize_with = "lenient::id_or_empty"
    )]
    pub movie_id: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub vote_count: u64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub popularity: f64,
    #[serde(default, deserialize_with = "lenient::optional_year")]
    pub release_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub poster_path: Option<String>,
}

impl Movie {
    /// Builds a movie from a document source, falling back to `doc_id`
    /// when the document has no `movieId`.
    pub fn from_source(doc_id: &str, source: &Value) -> Self {
        let mut movie = match serde_json::from_value::<Movie>(source.clone()) {
            Ok(movie) => movie,
            Err(e) => {
                tracing::warn!(doc_id = %doc_id, error = %e, "Malformed movie document, using defaults");
                Movie::default()
            }
        };

        if movie.movie_id.is_empty() {
            movie.movie_id = doc_id.to_string();
        }

        movie
    }
}

/// Reads a dense vector stored under `field`.
///
/// Returns `None` when the field is absent, empty, or holds non-numeric values.
pub fn vector_from_source(source: &Value, field: &str) -> Option<Vec<f64>> {
    let values = source.get(field)?.as_array()?;
    if values.is_empty() {
        return None;
    }
    values.iter().map(Value::as_f64).collect()
}

/// Joins a poster path onto the image base URL.
pub fn poster_url(image_base_url: &str, poster_path: Option<&str>) -> Option<String> {
    poster_path
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(|path| format!("{}{}", image_base_url.trim_end_matches('/'), path))
}

/// A movie ranked by the weighted rating
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    #[serde(flatten)]
    pub movie: Movie,
    pub weighted_rating: f64,
    /// Relevance score reported by the search engine
    pub original_score: f64,
}

/// A movie carrying a blended hybrid score
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub score: f64,
}

/// A full-text search hit
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieSearchResult {
    #[serde(flatten)]
    pub movie: Movie,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_movie_from_complete_source() {
        let source = json!({
            "movieId": 862,
            "title": "Toy Story",
            "description": "A cowboy doll is threatened by a new spaceman figure.",
            "vote_average": 7.7,
            "vote_count": 5415,
            "popularity": "21.946943",
            "release_year": 1995,
            "poster_path": "/rhIRbceoE9lR4veEXuwCC2wARtG.jpg",
            "model_factor": [0.1, 0.2]
        });

        let movie = Movie::from_source("862", &source);
        assert_eq!(movie.movie_id, "862");
        assert_eq!(movie.title, "Toy Story");
        assert_eq!(movie.vote_count, 5415);
        assert_eq!(movie.vote_average, 7.7);
        assert!((movie.popularity - 21.946943).abs() < 1e-9);
        assert_eq!(movie.release_year, Some(1995));
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let movie = Movie::from_source("31", &json!({ "title": "Sparse" }));
        assert_eq!(movie.movie_id, "31");
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.vote_count, 0);
        assert_eq!(movie.popularity, 0.0);
        assert_eq!(movie.release_year, None);
        assert_eq!(movie.description, None);
    }

    #[test]
    fn test_garbage_numbers_default_to_zero() {
        let movie = Movie::from_source(
            "7",
            &json!({ "popularity": "Beware Of Frost Bites", "vote_count": null, "vote_average": -1 }),
        );
        assert_eq!(movie.popularity, 0.0);
        assert_eq!(movie.vote_count, 0);
        assert_eq!(movie.vote_average, -1.0);
    }

    #[test]
    fn test_release_year_from_date_string() {
        let movie = Movie::from_source("1", &json!({ "release_year": "1999-03-31" }));
        assert_eq!(movie.release_year, Some(1999));
    }

    #[test]
    fn test_serialized_movie_uses_snake_case_id() {
        let movie = Movie::from_source("5", &json!({ "movieId": "5", "title": "Four Rooms" }));
        let value = serde_json::to_value(&movie).unwrap();
        assert_eq!(value["movie_id"], "5");
        assert!(value.get("movieId").is_none());
    }

    #[test]
    fn test_vector_from_source() {
        let source = json!({ "meta_factor": [0.5, -1.0, 2], "empty": [], "bad": ["x"] });
        assert_eq!(
            vector_from_source(&source, "meta_factor"),
            Some(vec![0.5, -1.0, 2.0])
        );
        assert_eq!(vector_from_source(&source, "empty"), None);
        assert_eq!(vector_from_source(&source, "bad"), None);
        assert_eq!(vector_from_source(&source, "missing"), None);
    }

    #[test]
    fn test_poster_url() {
        let base = "https://image.tmdb.org/t/p/w500";
        assert_eq!(
            poster_url(base, Some("/abc.jpg")),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg".to_string())
        );
        assert_eq!(poster_url(base, Some("")), None);
        assert_eq!(poster_url(base, None), None);
    }
}
