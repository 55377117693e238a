use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Movie, MovieId};

/// Normalizes a title for matching: trims surrounding whitespace and lowercases
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// The movie catalog in its declared order
///
/// Lookup tables are derived from `entries` and rebuilt on deserialization,
/// so a snapshot only carries the entries themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Movie>", into = "Vec<Movie>")]
pub struct Catalog {
    entries: Vec<Movie>,
    normalized: Vec<String>,
    /// movieId -> position of its first entry
    first_by_id: HashMap<MovieId, usize>,
}

impl Catalog {
    pub fn new(entries: Vec<Movie>) -> Self {
        let normalized = entries.iter().map(|m| normalize_title(&m.title)).collect();

        let mut first_by_id = HashMap::with_capacity(entries.len());
        for (position, movie) in entries.iter().enumerate() {
            first_by_id.entry(movie.movie_id).or_insert(position);
        }

        Self {
            entries,
            normalized,
            first_by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in declared order
    pub fn entries(&self) -> &[Movie] {
        &self.entries
    }

    /// Canonical title of a movie; the first entry wins when ids repeat
    pub fn title_of(&self, movie_id: MovieId) -> Option<&str> {
        self.first_by_id
            .get(&movie_id)
            .map(|&position| self.entries[position].title.as_str())
    }

    /// Entries paired with their normalized titles, in declared order
    pub fn normalized_entries(&self) -> impl Iterator<Item = (&Movie, &str)> {
        self.entries
            .iter()
            .zip(self.normalized.iter().map(String::as_str))
    }
}

impl From<Vec<Movie>> for Catalog {
    fn from(entries: Vec<Movie>) -> Self {
        Self::new(entries)
    }
}

impl From<Catalog> for Vec<Movie> {
    fn from(catalog: Catalog) -> Self {
        catalog.entries
    }
}
