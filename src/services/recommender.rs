use ndarray::Array1;
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    models::{MovieId, Recommendation},
    services::{similarity::SimilarityModel, title_search::resolve_titles},
};

/// Item-item recommendation queries against a built similarity model
///
/// Cheap to clone; clones share the same model.
#[derive(Debug, Clone)]
pub struct Recommender {
    model: Arc<SimilarityModel>,
}

impl Recommender {
    pub fn new(model: Arc<SimilarityModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &SimilarityModel {
        &self.model
    }

    /// Recommends up to `top_n` movies similar to the liked `titles`
    ///
    /// Titles resolve against the catalog (exact normalized match, then first
    /// substring match). Seeds without a similarity row are skipped. The
    /// remaining similarity rows are averaged and ranked best-first; ties keep
    /// row order. Seeds and movies missing from the catalog are never returned.
    /// Unresolvable input yields an empty list rather than an error.
    pub fn recommend<S: AsRef<str>>(&self, titles: &[S], top_n: usize) -> Vec<Recommendation> {
        if titles.is_empty() || top_n == 0 {
            return Vec::new();
        }

        let seeds = resolve_titles(self.model.catalog(), titles);
        self.recommend_for_ids(&seeds, top_n)
    }

    /// Same as [`Recommender::recommend`] for already resolved movie ids
    pub fn recommend_for_ids(&self, seeds: &[MovieId], top_n: usize) -> Vec<Recommendation> {
        if top_n == 0 {
            return Vec::new();
        }

        let Some(aggregate) = self.aggregate(seeds) else {
            tracing::debug!(seeds = seeds.len(), "No seed has a similarity row");
            return Vec::new();
        };

        let index = self.model.index();
        let seed_rows: HashSet<usize> = seeds.iter().filter_map(|id| index.row_of(*id)).collect();

        let mut ranked: Vec<(usize, f64)> = aggregate.iter().copied().enumerate().collect();
        // stable: equal scores stay in row order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let catalog = self.model.catalog();
        ranked
            .into_iter()
            .filter(|(row, _)| !seed_rows.contains(row))
            .filter_map(|(row, score)| {
                let movie_id = index.movie_at(row)?;
                let title = catalog.title_of(movie_id)?;
                Some(Recommendation {
                    movie_id,
                    title: title.to_string(),
                    score,
                })
            })
            .take(top_n)
            .collect()
    }

    /// Element-wise mean of the seeds' similarity rows, one term per seed occurrence
    fn aggregate(&self, seeds: &[MovieId]) -> Option<Array1<f64>> {
        let mut sum: Option<Array1<f64>> = None;
        let mut count = 0usize;

        for row in seeds.iter().filter_map(|id| self.model.similarity_row(*id)) {
            match sum.as_mut() {
                Some(acc) => *acc += &row,
                None => sum = Some(row.to_owned()),
            }
            count += 1;
        }

        sum.map(|acc| acc / count as f64)
    }
}
