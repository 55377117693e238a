use std::sync::Arc;

use crate::{
    models::{EnrichedRecommendation, Recommendation},
    services::providers::MetadataProvider,
};

/// Attaches poster URLs to ranked recommendations
///
/// Lookups run in parallel. A failed lookup is logged and leaves the poster
/// empty; order and scores are passed through untouched.
pub async fn enrich_recommendations(
    provider: Option<Arc<dyn MetadataProvider>>,
    recommendations: Vec<Recommendation>,
) -> Vec<EnrichedRecommendation> {
    let Some(provider) = provider else {
        return recommendations
            .into_iter()
            .map(|recommendation| EnrichedRecommendation {
                recommendation,
                poster: None,
            })
            .collect();
    };

    let mut tasks = Vec::with_capacity(recommendations.len());
    for recommendation in &recommendations {
        let provider = Arc::clone(&provider);
        let title = recommendation.title.clone();
        tasks.push(tokio::spawn(async move { provider.poster_url(&title).await }));
    }

    let mut enriched = Vec::with_capacity(recommendations.len());
    for (recommendation, task) in recommendations.into_iter().zip(tasks) {
        let poster = match task.await {
            Ok(Ok(poster)) => poster,
            Ok(Err(e)) => {
                tracing::warn!(
                    error = %e,
                    movie_id = recommendation.movie_id,
                    provider = provider.name(),
                    "Poster lookup failed"
                );
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Poster task join error");
                None
            }
        };
        enriched.push(EnrichedRecommendation {
            recommendation,
            poster,
        });
    }

    enriched
}
