use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::{Movie, MoviePage};

const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const POSTER_PLACEHOLDER: &str = "https://via.placeholder.com/500x750?text=Sem+Imagem";
pub const DETAILS_UNAVAILABLE: &str = "Falha ao buscar os detalhes do filme.";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Página inválida: {0}.")]
    InvalidPage(u32),
    #[error("Não foi possível conectar ao catálogo de filmes.")]
    Transport(#[source] reqwest::Error),
    #[error("O catálogo de filmes respondeu com o status {status}.")]
    Status { status: u16 },
    #[error("{}", DETAILS_UNAVAILABLE)]
    DetailsUnavailable { status: u16 },
    #[error("Resposta inesperada do catálogo de filmes.")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors carry the full URL, api_key included.
        CatalogError::Transport(err.without_url())
    }
}

/// Read-only access to the movie catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_popular(&self, page: u32) -> Result<MoviePage, CatalogError>;
    /// Resolves to `None` without touching the network when `query` is blank.
    async fn search_movies(&self, query: &str, page: u32)
        -> Result<Option<MoviePage>, CatalogError>;
    async fn fetch_movie_details(&self, id: i64) -> Result<Movie, CatalogError>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(base_url: &str, api_key: &str, language: &str) -> anyhow::Result<Self> {
        let user_agent = format!("busca-filmes/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: language.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(&config.tmdb_base_url, &config.tmdb_api_key, &config.language)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        url: &str,
    ) -> Result<T, CatalogError> {
        debug!(endpoint, "Requesting catalog");
        let res = self.client.get(url).send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            debug!(endpoint, status = status.as_u16(), "Catalog returned an error status");
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn fetch_popular(&self, page: u32) -> Result<MoviePage, CatalogError> {
        if page == 0 {
            return Err(CatalogError::InvalidPage(page));
        }
        let url = format!(
            "{}/movie/popular?api_key={}&language={}&page={page}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language)
        );
        self.get_json("movie/popular", &url).await
    }

    async fn search_movies(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Option<MoviePage>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        if page == 0 {
            return Err(CatalogError::InvalidPage(page));
        }
        let url = format!(
            "{}/search/movie?api_key={}&query={}&language={}&page={page}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(query),
            urlencoding::encode(&self.language)
        );
        self.get_json("search/movie", &url).await.map(Some)
    }

    async fn fetch_movie_details(&self, id: i64) -> Result<Movie, CatalogError> {
        let url = format!(
            "{}/movie/{id}?api_key={}&language={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language)
        );
        self.get_json("movie/details", &url)
            .await
            .map_err(|err| match err {
                CatalogError::Status { status } => CatalogError::DetailsUnavailable { status },
                other => other,
            })
    }
}

pub fn poster_url(poster_path: Option<&str>) -> String {
    match poster_path.filter(|p| !p.is_empty()) {
        Some(path) => format!("{POSTER_BASE}{path}"),
        None => POSTER_PLACEHOLDER.to_string(),
    }
}

pub fn parse_tmdb_id(input: &str) -> Option<i64> {
    if input.chars().all(|c| c.is_ascii_digit()) {
        return input.parse().ok();
    }
    None
}
