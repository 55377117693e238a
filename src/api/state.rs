use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::models::MovieId;
use crate::services::providers::{MetadataProvider, TmdbProvider};
use crate::services::{ModelStore, SimilarityModel};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Currently served similarity model
    pub models: ModelStore,
    /// Poster/details provider; `None` when no API key is configured
    pub metadata: Option<Arc<dyn MetadataProvider>>,
    /// movieId -> TMDB id
    pub tmdb_links: Arc<HashMap<MovieId, u64>>,
    pub config: Arc<Config>,
    /// Held for the whole rebuild, so rebuilds run one at a time
    pub rebuild_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Creates state around a built model, wiring TMDB when a key is present
    pub fn new(model: SimilarityModel, tmdb_links: HashMap<MovieId, u64>, config: Config) -> Self {
        let metadata = config.tmdb_key().map(|key| {
            Arc::new(TmdbProvider::new(key.to_string(), config.tmdb_api_url.clone()))
                as Arc<dyn MetadataProvider>
        });

        if metadata.is_none() {
            tracing::warn!("TMDB_API_KEY not set, posters and movie details disabled");
        }

        Self::with_provider(model, tmdb_links, config, metadata)
    }

    /// Creates state with an explicit metadata provider
    pub fn with_provider(
        model: SimilarityModel,
        tmdb_links: HashMap<MovieId, u64>,
        config: Config,
        metadata: Option<Arc<dyn MetadataProvider>>,
    ) -> Self {
        Self {
            models: ModelStore::new(model),
            metadata,
            tmdb_links: Arc::new(tmdb_links),
            config: Arc::new(config),
            rebuild_lock: Arc::new(Mutex::new(())),
        }
    }
}
