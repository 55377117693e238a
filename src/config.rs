use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Movie catalog CSV (movieId,title,...)
    #[serde(default = "default_movies_csv")]
    pub movies_csv: String,

    /// Ratings CSV (userId,movieId,rating,...)
    #[serde(default = "default_ratings_csv")]
    pub ratings_csv: String,

    /// External id links CSV (movieId,imdbId,tmdbId)
    #[serde(default = "default_links_csv")]
    pub links_csv: String,

    /// Location of the serialized model snapshot
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Ignore an existing snapshot and rebuild from the CSV files at startup
    #[serde(default)]
    pub rebuild_model: bool,

    /// Number of recommendations returned when the request does not say
    #[serde(default = "default_top_n")]
    pub default_top_n: i64,

    /// TMDB API key; poster and details lookups are disabled without it
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_movies_csv() -> String {
    "data/movies.csv".to_string()
}

fn default_ratings_csv() -> String {
    "data/ratings.csv".to_string()
}

fn default_links_csv() -> String {
    "data/links.csv".to_string()
}

fn default_model_path() -> String {
    "model.bin".to_string()
}

fn default_top_n() -> i64 {
    5
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// TMDB key, treating an empty value as unset
    pub fn tmdb_key(&self) -> Option<&str> {
        self.tmdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            movies_csv: default_movies_csv(),
            ratings_csv: default_ratings_csv(),
            links_csv: default_links_csv(),
            model_path: default_model_path(),
            rebuild_model: false,
            default_top_n: default_top_n(),
            tmdb_api_key: None,
            tmdb_api_url: default_tmdb_api_url(),
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envy_defaults() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.movies_csv, "data/movies.csv");
        assert_eq!(config.default_top_n, 5);
        assert_eq!(config.port, 3000);
        assert!(!config.rebuild_model);
        assert!(config.tmdb_key().is_none());
    }

    #[test]
    fn test_envy_overrides() {
        let vars = vec![
            ("MODEL_PATH".to_string(), "/tmp/m.bin".to_string()),
            ("REBUILD_MODEL".to_string(), "true".to_string()),
            ("TMDB_API_KEY".to_string(), "abc".to_string()),
            ("PORT".to_string(), "8080".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.model_path, "/tmp/m.bin");
        assert!(config.rebuild_model);
        assert_eq!(config.tmdb_key(), Some("abc"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_blank_tmdb_key_is_unset() {
        let config = Config {
            tmdb_api_key: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.tmdb_key().is_none());
    }
}
