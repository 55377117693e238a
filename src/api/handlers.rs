use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data;
use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::{EnrichedRecommendation, MovieDetails, MovieId};
use crate::services::{enrichment::enrich_recommendations, SimilarityModel};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub titles: Vec<String>,
    /// Falls back to the configured default; zero or negative yields no results
    #[serde(default)]
    pub top_n: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub input: Vec<String>,
    pub recommendations: Vec<EnrichedRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct TitlesResponse {
    pub titles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub items: usize,
    pub users: usize,
    pub ratings: usize,
    pub built_at: DateTime<Utc>,
}

impl From<&SimilarityModel> for HealthResponse {
    fn from(model: &SimilarityModel) -> Self {
        let info = model.info();
        Self {
            status: "healthy",
            items: info.items,
            users: info.users,
            ratings: info.ratings,
            built_at: info.built_at,
        }
    }
}

// Handlers

/// Health check endpoint, reporting the served model
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.models.current().await;
    Json(HealthResponse::from(model.as_ref()))
}

/// Recommend movies similar to the liked titles
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendRequest>,
) -> Json<RecommendResponse> {
    let top_n = request.top_n.unwrap_or(state.config.default_top_n);
    let top_n = usize::try_from(top_n).unwrap_or(0);

    let recommender = state.models.recommender().await;
    let recommendations = recommender.recommend(request.titles.as_slice(), top_n);

    tracing::info!(
        request_id = %request_id,
        titles = request.titles.len(),
        top_n = top_n,
        results = recommendations.len(),
        "Recommendations computed"
    );

    let recommendations = enrich_recommendations(state.metadata.clone(), recommendations).await;

    Json(RecommendResponse {
        input: request.titles,
        recommendations,
    })
}

/// All catalog titles in catalog order
pub async fn get_titles(State(state): State<AppState>) -> Json<TitlesResponse> {
    let model = state.models.current().await;
    let titles = model
        .catalog()
        .entries()
        .iter()
        .map(|movie| movie.title.clone())
        .collect();
    Json(TitlesResponse { titles })
}

/// Movie details from the metadata provider
pub async fn movie_details(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<MovieDetails>> {
    let provider = state
        .metadata
        .clone()
        .ok_or_else(|| AppError::MissingConfig("TMDB_API_KEY missing".to_string()))?;

    let tmdb_id = *state
        .tmdb_links
        .get(&movie_id)
        .ok_or_else(|| AppError::NotFound(format!("No TMDB ID found for movie {}", movie_id)))?;

    let details = provider.movie_details(movie_id, tmdb_id).await?;
    Ok(Json(details))
}

/// Rebuild the model from the CSV files and swap it in
///
/// Concurrent requests queue up; each one builds, saves and swaps in turn.
pub async fn rebuild_model(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<HealthResponse>> {
    tracing::info!(request_id = %request_id, "Model rebuild requested");

    let _rebuild = state.rebuild_lock.lock().await;
    let config = state.config.clone();
    let model = tokio::task::spawn_blocking(move || data::rebuild_and_save(&config))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let response = HealthResponse::from(&model);
    state.models.replace(model).await;

    tracing::info!(request_id = %request_id, items = response.items, "Model rebuild completed");

    Ok(Json(response))
}
