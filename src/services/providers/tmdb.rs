/// TMDB (The Movie Database) provider
///
/// API Flow:
/// 1. Poster: /search/movie?query={title without year} → first hit's poster_path
/// 2. Details: /movie/{tmdb_id} and /movie/{tmdb_id}/videos → trailer key
use crate::{
    error::{AppError, AppResult},
    models::{MovieDetails, MovieId, TmdbMovieDetails, TmdbSearchResponse, TmdbVideo, TmdbVideos},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const DETAILS_LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

/// Catalog titles carry a trailing "(year)"; TMDB search wants the bare name
fn search_query(title: &str) -> &str {
    title.split('(').next().unwrap_or(title).trim()
}

fn image_url(poster_path: &str) -> String {
    format!("{}{}", IMAGE_BASE_URL, poster_path)
}

/// First YouTube trailer or teaser
fn trailer_key(videos: &[TmdbVideo]) -> Option<String> {
    videos
        .iter()
        .find(|v| {
            v.site == "YouTube"
                && matches!(v.video_type.to_lowercase().as_str(), "trailer" | "teaser")
        })
        .map(|v| v.key.clone())
}

fn details_from(movie_id: MovieId, details: TmdbMovieDetails, videos: &TmdbVideos) -> MovieDetails {
    MovieDetails {
        movie_id,
        title: details.title,
        overview: details.overview,
        genres: details.genres.into_iter().map(|g| g.name).collect(),
        release_date: details.release_date,
        tmdb_rating: details.vote_average,
        poster: details.poster_path.as_deref().map(image_url),
        youtube_key: trailer_key(&videos.results),
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn poster_url(&self, title: &str) -> AppResult<Option<String>> {
        let query = search_query(title);
        if query.is_empty() {
            return Ok(None);
        }

        let search: TmdbSearchResponse = self
            .get_json("/search/movie", &[("query", query)])
            .await?;

        let poster = search
            .results
            .first()
            .and_then(|hit| hit.poster_path.as_deref())
            .map(image_url);

        tracing::debug!(
            query = %query,
            results = search.results.len(),
            found = poster.is_some(),
            provider = "tmdb",
            "Poster search completed"
        );

        Ok(poster)
    }

    async fn movie_details(&self, movie_id: MovieId, provider_id: u64) -> AppResult<MovieDetails> {
        let details_path = format!("/movie/{}", provider_id);
        let videos_path = format!("/movie/{}/videos", provider_id);
        let params = [("language", DETAILS_LANGUAGE)];

        let (details, videos) = tokio::try_join!(
            self.get_json::<TmdbMovieDetails>(&details_path, &params),
            self.get_json::<TmdbVideos>(&videos_path, &params),
        )?;

        tracing::info!(
            movie_id = movie_id,
            tmdb_id = provider_id,
            videos = videos.results.len(),
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(details_from(movie_id, details, &videos))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
