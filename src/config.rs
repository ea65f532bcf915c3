use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "pt-BR";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub language: String,
    pub data_dir: PathBuf,
}

impl Config {
    /// Reads settings from the process environment. A missing API key is not
    /// fatal: the catalog service rejects the requests instead.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tmdb_api_key = non_empty("TMDB_API_KEY").unwrap_or_else(|| {
            warn!("TMDB_API_KEY is not set; catalog requests will be rejected");
            String::new()
        });
        let tmdb_base_url = non_empty("TMDB_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_TMDB_BASE.to_string());
        let language = non_empty("TMDB_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let data_dir = non_empty("BUSCA_FILMES_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Self {
            tmdb_api_key,
            tmdb_base_url,
            language,
            data_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn falls_back_to_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.tmdb_api_key, "");
        assert_eq!(config.tmdb_base_url, DEFAULT_TMDB_BASE);
        assert_eq!(config.language, "pt-BR");
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let vars = HashMap::from([
            ("TMDB_API_KEY", "abc"),
            ("TMDB_BASE_URL", "http://127.0.0.1:9000/3/"),
            ("TMDB_LANGUAGE", "en-US"),
            ("BUSCA_FILMES_DATA_DIR", "/tmp/favs"),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.tmdb_api_key, "abc");
        assert_eq!(config.tmdb_base_url, "http://127.0.0.1:9000/3");
        assert_eq!(config.language, "en-US");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/favs"));
    }
}
