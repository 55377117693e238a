//! CSV readers for the MovieLens-style input relations
//!
//! Columns are matched by header name; extra columns (`timestamp`, `genres`)
//! are ignored. A missing column or an unparsable value fails the load.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{Catalog, Link, Movie, MovieId, Rating},
};

fn read_rows<T, R>(reader: R) -> AppResult<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::Reader::from_reader(reader);
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

fn open(path: &Path) -> AppResult<std::fs::File> {
    std::fs::File::open(path).map_err(|e| {
        AppError::InvalidData(format!("Failed to open {}: {}", path.display(), e))
    })
}

/// Reads ratings (`userId,movieId,rating`)
pub fn read_ratings<R: Read>(reader: R) -> AppResult<Vec<Rating>> {
    read_rows(reader)
}

/// Reads the movie catalog (`movieId,title`), keeping file order
pub fn read_catalog<R: Read>(reader: R) -> AppResult<Catalog> {
    let movies: Vec<Movie> = read_rows(reader)?;
    Ok(Catalog::new(movies))
}

/// Reads links (`movieId,imdbId,tmdbId`) into a movieId -> tmdbId map
///
/// The last row wins for repeated ids; a movie whose winning row has no usable
/// tmdbId (blank, non-numeric or 0) is left out.
pub fn read_links<R: Read>(reader: R) -> AppResult<HashMap<MovieId, u64>> {
    let links: Vec<Link> = read_rows(reader)?;
    let mut latest: HashMap<MovieId, Option<u64>> = HashMap::with_capacity(links.len());
    for link in links {
        latest.insert(link.movie_id, link.tmdb_id.filter(|id| *id != 0));
    }
    let tmdb_ids = latest
        .into_iter()
        .filter_map(|(movie_id, tmdb_id)| tmdb_id.map(|id| (movie_id, id)))
        .collect();
    Ok(tmdb_ids)
}

pub fn load_ratings(path: impl AsRef<Path>) -> AppResult<Vec<Rating>> {
    let path = path.as_ref();
    let ratings = read_ratings(open(path)?)?;
    tracing::info!(path = %path.display(), rows = ratings.len(), "Loaded ratings");
    Ok(ratings)
}

pub fn load_catalog(path: impl AsRef<Path>) -> AppResult<Catalog> {
    let path = path.as_ref();
    let catalog = read_catalog(open(path)?)?;
    tracing::info!(path = %path.display(), movies = catalog.len(), "Loaded movie catalog");
    Ok(catalog)
}

/// Loads links if the file exists; a missing file yields an empty map
pub fn load_links(path: impl AsRef<Path>) -> AppResult<HashMap<MovieId, u64>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Links file not found, movie details disabled");
        return Ok(HashMap::new());
    }
    let links = read_links(open(path)?)?;
    tracing::info!(path = %path.display(), links = links.len(), "Loaded TMDB links");
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_ratings_ignores_extra_columns() {
        let data = "userId,movieId,rating,timestamp\n1,1,4.0,964982703\n1,3,4.5,964981247\n";
        let ratings = read_ratings(data.as_bytes()).unwrap();
        assert_eq!(ratings, vec![Rating::new(1, 1, 4.0), Rating::new(1, 3, 4.5)]);
    }

    #[test]
    fn test_read_ratings_missing_column_fails() {
        let data = "userId,movieId\n1,1\n";
        let result = read_ratings(data.as_bytes());
        assert!(matches!(result, Err(AppError::Csv(_))));
    }

    #[test]
    fn test_read_ratings_bad_number_fails() {
        let data = "userId,movieId,rating\n1,one,4.0\n";
        assert!(read_ratings(data.as_bytes()).is_err());
    }

    #[test]
    fn test_read_catalog_keeps_order_and_quoted_titles() {
        let data = "movieId,title,genres\n2,Jumanji (1995),Adventure\n11,\"American President, The (1995)\",Comedy\n";
        let catalog = read_catalog(data.as_bytes()).unwrap();
        assert_eq!(catalog.entries()[0], Movie::new(2, "Jumanji (1995)"));
        assert_eq!(catalog.entries()[1].title, "American President, The (1995)");
    }

    #[test]
    fn test_read_links_drops_unusable_ids() {
        let data = "movieId,imdbId,tmdbId\n1,0114709,862\n2,0113497,\n3,0113228,0\n";
        let links = read_links(data.as_bytes()).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links.get(&1), Some(&862));
    }

    #[test]
    fn test_read_links_last_row_wins() {
        let data = "movieId,imdbId,tmdbId\n1,0114709,862\n1,0000000,999\n2,0113497,8844\n2,0113497,\n";
        let links = read_links(data.as_bytes()).unwrap();
        assert_eq!(links.get(&1), Some(&999));
        assert_eq!(links.get(&2), None);
    }

    #[test]
    fn test_load_links_missing_file_is_empty() {
        let path = std::env::temp_dir().join(format!("missing-links-{}.csv", uuid::Uuid::new_v4()));
        let links = load_links(&path).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_load_ratings_missing_file_fails() {
        let path = std::env::temp_dir().join(format!("missing-ratings-{}.csv", uuid::Uuid::new_v4()));
        assert!(matches!(load_ratings(&path), Err(AppError::InvalidData(_))));
    }
}
