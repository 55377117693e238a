pub mod loader;
pub mod snapshot;

pub use loader::{load_catalog, load_links, load_ratings};
pub use snapshot::{load_snapshot, save_snapshot};

use std::path::Path;

use crate::{config::Config, error::AppResult, services::SimilarityModel};

/// Reads the catalog and ratings CSVs and builds a fresh model
pub fn build_from_csv(config: &Config) -> AppResult<SimilarityModel> {
    let catalog = load_catalog(&config.movies_csv)?;
    let ratings = load_ratings(&config.ratings_csv)?;
    SimilarityModel::build(&ratings, catalog)
}

/// Builds from CSV and persists the snapshot
pub fn rebuild_and_save(config: &Config) -> AppResult<SimilarityModel> {
    let model = build_from_csv(config)?;
    save_snapshot(&config.model_path, &model)?;
    Ok(model)
}

/// Startup path: reuse the snapshot when present, otherwise build and save one
///
/// An unreadable snapshot is not silently replaced; the error is returned so
/// the operator can delete it or set `REBUILD_MODEL`.
pub fn load_or_build(config: &Config) -> AppResult<SimilarityModel> {
    if !config.rebuild_model && Path::new(&config.model_path).exists() {
        return load_snapshot(&config.model_path);
    }

    tracing::info!(
        movies = %config.movies_csv,
        ratings = %config.ratings_csv,
        rebuild = config.rebuild_model,
        "Building similarity model from CSV"
    );
    rebuild_and_save(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("reelsim-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("movies.csv"),
            "movieId,title,genres\n1,Toy Story (1995),Animation\n2,Jumanji (1995),Adventure\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("ratings.csv"),
            "userId,movieId,rating,timestamp\n1,1,4.0,0\n1,2,4.0,0\n2,1,5.0,0\n",
        )
        .unwrap();
        dir
    }

    fn config(dir: &Path) -> Config {
        Config {
            movies_csv: dir.join("movies.csv").display().to_string(),
            ratings_csv: dir.join("ratings.csv").display().to_string(),
            links_csv: dir.join("links.csv").display().to_string(),
            model_path: dir.join("model.bin").display().to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_load_or_build_creates_then_reuses_snapshot() {
        let dir = fixture_dir();
        let config = config(&dir);

        let built = load_or_build(&config).unwrap();
        assert!(Path::new(&config.model_path).exists());

        // ratings change on disk but the snapshot wins
        std::fs::write(dir.join("ratings.csv"), "userId,movieId,rating\n9,1,1.0\n").unwrap();
        let reloaded = load_or_build(&config).unwrap();
        assert_eq!(reloaded, built);

        let rebuilt = load_or_build(&Config {
            rebuild_model: true,
            ..config.clone()
        })
        .unwrap();
        assert_eq!(rebuilt.info().ratings, 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_concurrent_rebuilds_both_succeed() {
        let dir = fixture_dir();
        let config = config(&dir);

        for _ in 0..10 {
            std::thread::scope(|scope| {
                let first = scope.spawn(|| rebuild_and_save(&config));
                let second = scope.spawn(|| rebuild_and_save(&config));
                assert_eq!(first.join().unwrap().unwrap().info().items, 2);
                assert_eq!(second.join().unwrap().unwrap().info().items, 2);
            });
            assert_eq!(load_snapshot(&config.model_path).unwrap().info().items, 2);
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_build_fails_on_missing_ratings() {
        let dir = fixture_dir();
        std::fs::remove_file(dir.join("ratings.csv")).unwrap();

        assert!(build_from_csv(&config(&dir)).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
