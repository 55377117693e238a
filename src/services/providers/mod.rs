/// Display metadata provider abstraction
///
/// Providers supply posters and detail pages for movies that the recommender
/// has already ranked. They never influence ranking or scores.
use crate::{
    error::AppResult,
    models::{MovieDetails, MovieId},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Poster image URL for a catalog title, if the provider knows one
    async fn poster_url(&self, title: &str) -> AppResult<Option<String>>;

    /// Detail page for a movie by the provider's own id
    ///
    /// `movie_id` is echoed into the result so callers can correlate it with
    /// the catalog.
    async fn movie_details(&self, movie_id: MovieId, provider_id: u64) -> AppResult<MovieDetails>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
