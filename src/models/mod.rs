use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod tmdb;

pub use catalog::{normalize_title, Catalog};
pub use tmdb::{TmdbMovie, TmdbMovieDetails, TmdbSearchResponse, TmdbVideo, TmdbVideos};

/// External MovieLens movie identifier
pub type MovieId = i64;

/// External MovieLens user identifier
pub type UserId = i64;

/// One row of the ratings relation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub rating: f64,
}

impl Rating {
    pub fn new(user_id: UserId, movie_id: MovieId, rating: f64) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
        }
    }
}

/// One row of the movie catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub title: String,
}

impl Movie {
    pub fn new(movie_id: MovieId, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
        }
    }
}

/// One row of the external id links relation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    #[serde(rename = "imdbId", default, deserialize_with = "csv::invalid_option")]
    pub imdb_id: Option<String>,
    #[serde(rename = "tmdbId", default, deserialize_with = "csv::invalid_option")]
    pub tmdb_id: Option<u64>,
}

/// A ranked recommendation returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    /// Mean cosine similarity to the resolved seeds, unmodified
    pub score: f64,
}

/// Recommendation with display metadata attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub poster: Option<String>,
}

/// Movie details assembled from TMDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub genres: Vec<String>,
    pub release_date: Option<String>,
    pub tmdb_rating: Option<f64>,
    pub poster: Option<String>,
    pub youtube_key: Option<String>,
}
