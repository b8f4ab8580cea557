pub mod lenient;
pub mod movie;
pub mod tmdb;

pub use movie::{
    poster_url, vector_from_source, Movie, MovieSearchResult, Recommendation, ScoredMovie,
};
pub use tmdb::{Genre, MovieCard, MovieDetails, MovieDetailsView, TmdbError};
