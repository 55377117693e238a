use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use crate::{
    error::{AppError, AppResult},
    models::{Catalog, MovieId, Rating, UserId},
};

/// Bidirectional movieId <-> matrix row mapping
///
/// Rows are ordered by ascending movieId. Only the ordered id list is
/// serialized; the reverse table is rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MovieId>", into = "Vec<MovieId>")]
pub struct IndexMapping {
    movie_ids: Vec<MovieId>,
    rows: HashMap<MovieId, usize>,
}

impl IndexMapping {
    fn from_ids(movie_ids: Vec<MovieId>) -> Self {
        let rows = movie_ids
            .iter()
            .enumerate()
            .map(|(row, id)| (*id, row))
            .collect();
        Self { movie_ids, rows }
    }

    pub fn len(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movie_ids.is_empty()
    }

    pub fn row_of(&self, movie_id: MovieId) -> Option<usize> {
        self.rows.get(&movie_id).copied()
    }

    pub fn movie_at(&self, row: usize) -> Option<MovieId> {
        self.movie_ids.get(row).copied()
    }

    /// Movie ids in row order
    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }
}

impl TryFrom<Vec<MovieId>> for IndexMapping {
    type Error = String;

    fn try_from(movie_ids: Vec<MovieId>) -> Result<Self, Self::Error> {
        let mapping = Self::from_ids(movie_ids);
        if mapping.rows.len() != mapping.movie_ids.len() {
            return Err("index mapping contains duplicate movie ids".to_string());
        }
        Ok(mapping)
    }
}

impl From<IndexMapping> for Vec<MovieId> {
    fn from(mapping: IndexMapping) -> Self {
        mapping.movie_ids
    }
}

/// Build provenance reported alongside the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub built_at: DateTime<Utc>,
    pub items: usize,
    pub users: usize,
    pub ratings: usize,
}

/// Item-item similarity model built once from a ratings relation
///
/// Holds the item-user matrix, the cosine similarity matrix, the row mapping
/// and the catalog used to name results. Nothing is mutated after `build`;
/// new ratings require a new model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityModel {
    item_user: Array2<f64>,
    similarity: Array2<f64>,
    index: IndexMapping,
    catalog: Catalog,
    info: ModelInfo,
}

impl SimilarityModel {
    /// Pivots `ratings` into an item-user matrix and computes pairwise cosine similarity
    ///
    /// Duplicate (user, movie) pairs are averaged. Non-finite ratings fail the build.
    pub fn build(ratings: &[Rating], catalog: Catalog) -> AppResult<Self> {
        let start = Instant::now();

        if let Some(bad) = ratings.iter().find(|r| !r.rating.is_finite()) {
            return Err(AppError::InvalidData(format!(
                "non-finite rating {} for user {} movie {}",
                bad.rating, bad.user_id, bad.movie_id
            )));
        }

        let movie_ids: BTreeSet<MovieId> = ratings.iter().map(|r| r.movie_id).collect();
        let user_ids: BTreeSet<UserId> = ratings.iter().map(|r| r.user_id).collect();

        let index = IndexMapping::from_ids(movie_ids.into_iter().collect());
        let columns: HashMap<UserId, usize> = user_ids
            .iter()
            .enumerate()
            .map(|(col, id)| (*id, col))
            .collect();

        let item_user = pivot(ratings, &index, &columns);
        let similarity = cosine_similarity(&item_user);

        let info = ModelInfo {
            built_at: Utc::now(),
            items: index.len(),
            users: columns.len(),
            ratings: ratings.len(),
        };

        tracing::info!(
            items = info.items,
            users = info.users,
            ratings = info.ratings,
            catalog = catalog.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Similarity model built"
        );

        Ok(Self {
            item_user,
            similarity,
            index,
            catalog,
            info,
        })
    }

    /// Reassembles a model from its parts, checking that the shapes agree
    pub fn from_parts(
        item_user: Array2<f64>,
        similarity: Array2<f64>,
        index: IndexMapping,
        catalog: Catalog,
        info: ModelInfo,
    ) -> AppResult<Self> {
        let model = Self {
            item_user,
            similarity,
            index,
            catalog,
            info,
        };
        model.validate()?;
        Ok(model)
    }

    /// Checks the shape invariants shared by the matrices and the mapping
    pub fn validate(&self) -> AppResult<()> {
        let n = self.index.len();
        let (sim_rows, sim_cols) = self.similarity.dim();
        if sim_rows != n || sim_cols != n {
            return Err(AppError::InvalidSnapshot(format!(
                "similarity matrix is {}x{}, expected {}x{}",
                sim_rows, sim_cols, n, n
            )));
        }
        if self.item_user.nrows() != n {
            return Err(AppError::InvalidSnapshot(format!(
                "item-user matrix has {} rows, expected {}",
                self.item_user.nrows(),
                n
            )));
        }
        if self.info.items != n || self.info.users != self.item_user.ncols() {
            return Err(AppError::InvalidSnapshot(
                "model info does not match matrix dimensions".to_string(),
            ));
        }
        Ok(())
    }

    pub fn item_user(&self) -> &Array2<f64> {
        &self.item_user
    }

    pub fn similarity(&self) -> &Array2<f64> {
        &self.similarity
    }

    pub fn index(&self) -> &IndexMapping {
        &self.index
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// Similarity row of a movie, if it was rated
    pub fn similarity_row(&self, movie_id: MovieId) -> Option<ArrayView1<'_, f64>> {
        self.index
            .row_of(movie_id)
            .map(|row| self.similarity.row(row))
    }
}

fn pivot(
    ratings: &[Rating],
    index: &IndexMapping,
    columns: &HashMap<UserId, usize>,
) -> Array2<f64> {
    let shape = (index.len(), columns.len());
    let mut sums = Array2::<f64>::zeros(shape);
    let mut counts = Array2::<u32>::zeros(shape);

    for rating in ratings {
        // Every id was collected from `ratings` above
        if let (Some(row), Some(&col)) = (index.row_of(rating.movie_id), columns.get(&rating.user_id)) {
            sums[[row, col]] += rating.rating;
            counts[[row, col]] += 1;
        }
    }

    ndarray::Zip::from(&mut sums)
        .and(&counts)
        .for_each(|sum, &count| {
            if count > 1 {
                *sum /= f64::from(count);
            }
        });
    sums
}

/// Pairwise cosine similarity between the rows of `matrix`
///
/// Zero-magnitude rows score 0 against everything, themselves included.
/// The upper triangle is mirrored so the result is exactly symmetric.
pub fn cosine_similarity(matrix: &Array2<f64>) -> Array2<f64> {
    let n = matrix.nrows();
    // Dividing by the largest magnitude first keeps the squared sum finite
    let scales: Array1<f64> =
        matrix.map_axis(Axis(1), |row| row.fold(0.0f64, |acc, v| acc.max(v.abs())));

    let mut normalized = matrix.clone();
    for (mut row, &scale) in normalized.axis_iter_mut(Axis(0)).zip(scales.iter()) {
        if scale > 0.0 {
            row /= scale;
            let norm = row.dot(&row).sqrt();
            row /= norm;
        }
    }

    let mut similarity = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        let row_i = normalized.row(i);
        for j in i..n {
            let value = row_i.dot(&normalized.row(j));
            similarity[[i, j]] = value;
            similarity[[j, i]] = value;
        }
    }
    similarity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Movie;

    const EPS: f64 = 1e-12;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Movie::new(1, "Toy Story (1995)"),
            Movie::new(2, "Jumanji (1995)"),
            Movie::new(3, "Grumpier Old Men (1995)"),
        ])
    }

    fn ratings() -> Vec<Rating> {
        vec![
            Rating::new(10, 3, 1.0),
            Rating::new(10, 1, 5.0),
            Rating::new(10, 2, 4.0),
            Rating::new(20, 1, 3.0),
            Rating::new(20, 2, 3.0),
            Rating::new(30, 3, 5.0),
        ]
    }

    #[test]
    fn test_build_shapes_and_mapping() {
        let model = SimilarityModel::build(&ratings(), catalog()).unwrap();

        assert_eq!(model.similarity().dim(), (3, 3));
        assert_eq!(model.item_user().dim(), (3, 3));
        assert_eq!(model.index().movie_ids(), &[1, 2, 3]);
        for row in 0..model.index().len() {
            let id = model.index().movie_at(row).unwrap();
            assert_eq!(model.index().row_of(id), Some(row));
        }
        assert_eq!(model.info().users, 3);
        assert_eq!(model.info().ratings, 6);
    }

    #[test]
    fn test_pivot_fills_missing_with_zero() {
        let model = SimilarityModel::build(&ratings(), catalog()).unwrap();
        let matrix = model.item_user();
        // rows: movies 1,2,3; columns: users 10,20,30
        assert_eq!(matrix.row(0).to_vec(), vec![5.0, 3.0, 0.0]);
        assert_eq!(matrix.row(2).to_vec(), vec![1.0, 0.0, 5.0]);
    }

    #[test]
    fn test_similarity_is_symmetric_cosine() {
        let model = SimilarityModel::build(&ratings(), catalog()).unwrap();
        let sim = model.similarity();

        for i in 0..3 {
            assert!((sim[[i, i]] - 1.0).abs() < EPS);
            for j in 0..3 {
                assert_eq!(sim[[i, j]], sim[[j, i]]);
            }
        }

        // [5,3,0] . [4,3,0] / (|..| |..|)
        let expected = (5.0 * 4.0 + 3.0 * 3.0) / (34.0f64.sqrt() * 25.0f64.sqrt());
        assert!((sim[[0, 1]] - expected).abs() < EPS);
    }

    #[test]
    fn test_duplicate_ratings_are_averaged() {
        let ratings = vec![
            Rating::new(1, 1, 2.0),
            Rating::new(1, 1, 4.0),
            Rating::new(2, 1, 1.0),
        ];
        let model = SimilarityModel::build(&ratings, catalog()).unwrap();
        assert_eq!(model.item_user().row(0).to_vec(), vec![3.0, 1.0]);
    }

    #[test]
    fn test_zero_row_scores_zero() {
        let ratings = vec![Rating::new(1, 1, 0.0), Rating::new(1, 2, 4.0)];
        let model = SimilarityModel::build(&ratings, catalog()).unwrap();
        let sim = model.similarity();
        assert_eq!(sim[[0, 0]], 0.0);
        assert_eq!(sim[[0, 1]], 0.0);
        assert!((sim[[1, 1]] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_large_ratings_do_not_overflow() {
        let ratings = vec![
            Rating::new(1, 1, 1e200),
            Rating::new(2, 1, 1e200),
            Rating::new(1, 2, 1e200),
            Rating::new(2, 2, 1e200),
        ];
        let model = SimilarityModel::build(&ratings, catalog()).unwrap();
        let sim = model.similarity();
        assert!((sim[[0, 1]] - 1.0).abs() < EPS);
        assert!((sim[[1, 1]] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_degenerate_inputs() {
        let empty = SimilarityModel::build(&[], catalog()).unwrap();
        assert_eq!(empty.similarity().dim(), (0, 0));
        assert!(empty.index().is_empty());

        let single = SimilarityModel::build(&[Rating::new(1, 2, 3.5)], catalog()).unwrap();
        assert_eq!(single.similarity().dim(), (1, 1));
        assert!((single.similarity()[[0, 0]] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_non_finite_rating_fails() {
        let ratings = vec![Rating::new(1, 1, f64::NAN)];
        let result = SimilarityModel::build(&ratings, catalog());
        assert!(matches!(result, Err(AppError::InvalidData(_))));
    }

    #[test]
    fn test_unrated_catalog_movie_has_no_row() {
        let model = SimilarityModel::build(&ratings(), catalog()).unwrap();
        assert!(model.similarity_row(2).is_some());
        assert!(model.similarity_row(99).is_none());
    }

    #[test]
    fn test_from_parts_rejects_mismatched_shapes() {
        let model = SimilarityModel::build(&ratings(), catalog()).unwrap();
        let result = SimilarityModel::from_parts(
            model.item_user().clone(),
            Array2::zeros((2, 2)),
            model.index().clone(),
            model.catalog().clone(),
            model.info().clone(),
        );
        assert!(matches!(result, Err(AppError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_index_mapping_rejects_duplicates() {
        assert!(IndexMapping::try_from(vec![1, 2, 2]).is_err());
        assert!(IndexMapping::try_from(vec![1, 2, 3]).is_ok());
    }
}
