use std::sync::Arc;

use tokio::sync::RwLock;

use crate::services::{recommender::Recommender, similarity::SimilarityModel};

/// Holder of the currently served model
///
/// The model (matrices, mapping and catalog together) is replaced as one
/// `Arc`, so a reader sees either the old model or the new one, never a mix.
#[derive(Clone)]
pub struct ModelStore {
    current: Arc<RwLock<Arc<SimilarityModel>>>,
}

impl ModelStore {
    pub fn new(model: SimilarityModel) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(model))),
        }
    }

    /// Snapshot of the current model; the lock is released before returning
    pub async fn current(&self) -> Arc<SimilarityModel> {
        Arc::clone(&*self.current.read().await)
    }

    /// Recommender bound to the current model
    pub async fn recommender(&self) -> Recommender {
        Recommender::new(self.current().await)
    }

    /// Swaps in a freshly built model, returning the one it replaced
    pub async fn replace(&self, model: SimilarityModel) -> Arc<SimilarityModel> {
        let mut guard = self.current.write().await;
        let previous = std::mem::replace(&mut *guard, Arc::new(model));
        tracing::info!(
            previous_items = previous.info().items,
            items = guard.info().items,
            "Model replaced"
        );
        previous
    }
}
