use crate::models::{normalize_title, Catalog, MovieId};

/// Resolves a free-text title to a catalog movie id
///
/// Matching is on normalized titles (trimmed, lowercased):
/// 1. whole-title equality, first catalog entry in declared order;
/// 2. otherwise substring containment, first catalog entry in declared order.
///
/// Returns `None` when nothing matches or the query is blank.
pub fn resolve_title(catalog: &Catalog, query: &str) -> Option<MovieId> {
    let needle = normalize_title(query);
    if needle.is_empty() {
        return None;
    }

    catalog
        .normalized_entries()
        .find(|(_, title)| *title == needle)
        .or_else(|| {
            catalog
                .normalized_entries()
                .find(|(_, title)| title.contains(needle.as_str()))
        })
        .map(|(movie, _)| movie.movie_id)
}

/// Resolves each title independently, silently dropping misses
pub fn resolve_titles<S: AsRef<str>>(catalog: &Catalog, titles: &[S]) -> Vec<MovieId> {
    titles
        .iter()
        .filter_map(|title| {
            let resolved = resolve_title(catalog, title.as_ref());
            if resolved.is_none() {
                tracing::debug!(title = %title.as_ref(), "Title did not resolve");
            }
            resolved
        })
        .collect()
}
