use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::movie::{poster_url, Movie};

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response from TMDB `GET /3/movie/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Set when the details were fetched, not part of the TMDB payload
    #[serde(default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

impl MovieDetails {
    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name.clone()).collect()
    }
}

/// Error body returned by TMDB on failed requests
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbError {
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub status_message: Option<String>,
}

// ============================================================================
// Presentation Types
// ============================================================================

/// Movie details with a resolved poster URL
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetailsView {
    #[serde(flatten)]
    pub details: MovieDetails,
    pub poster_url: Option<String>,
}

impl MovieDetailsView {
    pub fn new(details: MovieDetails, image_base_url: &str) -> Self {
        let poster_url = poster_url(image_base_url, details.poster_path.as_deref());
        Self {
            details,
            poster_url,
        }
    }
}

/// One tile in a recommendation grid
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieCard {
    pub movie_id: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub genres: Vec<String>,
    pub tagline: Option<String>,
    /// Ranking score shown alongside the tile
    pub score: f64,
}

impl MovieCard {
    /// Builds a card from TMDB metadata when available, otherwise from the
    /// search-engine document alone
    pub fn build(
        movie: &Movie,
        score: f64,
        details: Option<&MovieDetails>,
        image_base_url: &str,
    ) -> Self {
        match details {
            Some(details) => Self {
                movie_id: movie.movie_id.clone(),
                title: if details.title.is_empty() {
                    movie.title.clone()
                } else {
                    details.title.clone()
                },
                poster_url: poster_url(image_base_url, details.poster_path.as_deref())
                    .or_else(|| poster_url(image_base_url, movie.poster_path.as_deref())),
                genres: details.genre_names(),
                tagline: details.tagline.clone().filter(|t| !t.is_empty()),
                score,
            },
            None => Self {
                movie_id: movie.movie_id.clone(),
                title: if movie.title.is_empty() {
                    "Unknown".to_string()
                } else {
                    movie.title.clone()
                },
                poster_url: poster_url(image_base_url, movie.poster_path.as_deref()),
                genres: Vec::new(),
                tagline: None,
                score,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

    fn details_json() -> &'static str {
        r#"{
            "id": 862,
            "title": "Toy Story",
            "overview": "Led by Woody, Andy's toys live happily in his room.",
            "tagline": "Hang on for the comedy that goes to infinity and beyond!",
            "genres": [{"id": 16, "name": "Animation"}, {"id": 35, "name": "Comedy"}],
            "poster_path": "/uXDfjJbdP4ijW5hWSBrPrlKpxab.jpg",
            "release_date": "1995-10-30",
            "vote_average": 7.97,
            "runtime": 81,
            "budget": 30000000
        }"#
    }

    #[test]
    fn test_movie_details_deserialization() {
        let details: MovieDetails = serde_json::from_str(details_json()).unwrap();
        assert_eq!(details.id, 862);
        assert_eq!(details.title, "Toy Story");
        assert_eq!(details.genre_names(), vec!["Animation", "Comedy"]);
        assert_eq!(details.runtime, Some(81));
    }

    #[test]
    fn test_movie_details_minimal_payload() {
        let details: MovieDetails = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(details.title, "");
        assert!(details.genres.is_empty());
        assert_eq!(details.poster_path, None);
    }

    #[test]
    fn test_card_prefers_tmdb_metadata() {
        let details: MovieDetails = serde_json::from_str(details_json()).unwrap();
        let movie = Movie {
            movie_id: "862".to_string(),
            title: "toy story (1995)".to_string(),
            ..Movie::default()
        };

        let card = MovieCard::build(&movie, 0.75, Some(&details), IMAGE_BASE);
        assert_eq!(card.title, "Toy Story");
        assert_eq!(
            card.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/uXDfjJbdP4ijW5hWSBrPrlKpxab.jpg")
        );
        assert_eq!(card.genres.len(), 2);
        assert!(card.tagline.is_some());
        assert_eq!(card.score, 0.75);
    }

    #[test]
    fn test_card_falls_back_to_document() {
        let movie = Movie {
            movie_id: "3".to_string(),
            poster_path: Some("/p.jpg".to_string()),
            ..Movie::default()
        };

        let card = MovieCard::build(&movie, 1.0, None, IMAGE_BASE);
        assert_eq!(card.title, "Unknown");
        assert_eq!(
            card.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/p.jpg")
        );
        assert!(card.genres.is_empty());
    }

    #[test]
    fn test_details_view_resolves_poster() {
        let details: MovieDetails = serde_json::from_str(details_json()).unwrap();
        let view = MovieDetailsView::new(details, IMAGE_BASE);
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["title"], "Toy Story");
        assert_eq!(
            value["poster_url"],
            "https://image.tmdb.org/t/p/w500/uXDfjJbdP4ijW5hWSBrPrlKpxab.jpg"
        );
    }
}
