use tracing::warn;

use super::{RequestGeneration, Ticket};
use crate::favorites::FavoritesStore;
use crate::models::Movie;
use crate::storage::StorageError;
use crate::tmdb::{poster_url, CatalogApi, CatalogError};

pub const LOADING_DETAILS: &str = "Carregando detalhes...";
pub const ADD_FAVORITE: &str = "Adicionar aos Favoritos ☆";
pub const REMOVE_FAVORITE: &str = "Remover dos Favoritos ★";

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsState {
    Loading,
    Loaded(Box<Movie>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailsRequest {
    pub ticket: Ticket,
    pub movie_id: i64,
}

impl DetailsRequest {
    pub async fn execute(&self, catalog: &dyn CatalogApi) -> Result<Movie, CatalogError> {
        catalog.fetch_movie_details(self.movie_id).await
    }
}

/// Detail page for a single movie id.
#[derive(Debug)]
pub struct DetailsView {
    movie_id: i64,
    state: DetailsState,
    generation: RequestGeneration,
}

impl DetailsView {
    pub fn new(movie_id: i64) -> Self {
        Self {
            movie_id,
            state: DetailsState::Loading,
            generation: RequestGeneration::default(),
        }
    }

    pub fn movie_id(&self) -> i64 {
        self.movie_id
    }

    pub fn movie(&self) -> Option<&Movie> {
        match &self.state {
            DetailsState::Loaded(movie) => Some(movie.as_ref()),
            _ => None,
        }
    }

    pub fn mount(&mut self) -> DetailsRequest {
        self.state = DetailsState::Loading;
        DetailsRequest {
            ticket: self.generation.issue(),
            movie_id: self.movie_id,
        }
    }

    pub fn complete(
        &mut self,
        request: &DetailsRequest,
        outcome: Result<Movie, CatalogError>,
    ) -> bool {
        if !self.generation.is_current(request.ticket) || request.movie_id != self.movie_id {
            return false;
        }
        self.state = match outcome {
            Ok(movie) => DetailsState::Loaded(Box::new(movie)),
            Err(e) => {
                warn!("Details for movie {} failed: {:?}", request.movie_id, e);
                DetailsState::Failed(e.to_string())
            }
        };
        true
    }

    /// Adds or removes the loaded movie. Returns the new membership, or
    /// `None` while nothing is loaded.
    pub fn toggle_favorite(&self, favorites: &FavoritesStore) -> Result<Option<bool>, StorageError> {
        let Some(movie) = self.movie() else {
            return Ok(None);
        };
        if favorites.contains(movie.id) {
            favorites.remove(movie.id)?;
            Ok(Some(false))
        } else {
            favorites.add(movie.clone())?;
            Ok(Some(true))
        }
    }

    pub fn render(&self, favorites: &FavoritesStore) -> String {
        let movie = match &self.state {
            DetailsState::Loading => return LOADING_DETAILS.to_string(),
            DetailsState::Failed(message) => return format!("Erro: {message}"),
            DetailsState::Loaded(movie) => movie,
        };

        let mut out = vec!["← Voltar para a busca [/]".to_string(), String::new()];
        out.push(movie.title.clone());
        if let Some(tagline) = movie.tagline() {
            out.push(format!("\"{tagline}\""));
        }
        let date = movie
            .release_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        out.push(format!("⭐ {:.1} / 10 | {date}", movie.vote_average));
        if !movie.genres.is_empty() {
            let chips = movie
                .genres
                .iter()
                .map(|g| format!("[{}]", g.name))
                .collect::<Vec<_>>()
                .join(" ");
            out.push(chips);
        }
        out.push(format!("Pôster: {}", poster_url(movie.poster_path.as_deref())));
        out.push(String::new());
        out.push("Sinopse".to_string());
        out.push(movie.overview.clone());
        out.push(String::new());
        let label = if favorites.contains(movie.id) {
            REMOVE_FAVORITE
        } else {
            ADD_FAVORITE
        };
        out.push(format!("[{label}]"));
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Genre;
    use crate::storage::MemoryStorage;
    use crate::tmdb::DETAILS_UNAVAILABLE;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn inception() -> Movie {
        Movie {
            id: 27205,
            title: "A Origem".to_string(),
            overview: "Dom Cobb é um ladrão.".to_string(),
            release_date: NaiveDate::from_ymd_opt(2010, 7, 16),
            poster_path: Some("/p.jpg".to_string()),
            vote_average: 8.369,
            genres: vec![
                Genre {
                    id: 28,
                    name: "Ação".to_string(),
                },
                Genre {
                    id: 878,
                    name: "Ficção científica".to_string(),
                },
            ],
            tagline: Some("Sua mente é a cena do crime.".to_string()),
        }
    }

    fn store() -> FavoritesStore {
        FavoritesStore::initialize(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn renders_loaded_movie() {
        let favorites = store();
        let mut view = DetailsView::new(27205);
        let request = view.mount();
        assert_eq!(view.render(&favorites), LOADING_DETAILS);

        assert!(view.complete(&request, Ok(inception())));
        let rendered = view.render(&favorites);
        assert!(rendered.contains("\"Sua mente é a cena do crime.\""));
        assert!(rendered.contains("⭐ 8.4 / 10 | 16/07/2010"));
        assert!(rendered.contains("[Ação] [Ficção científica]"));
        assert!(rendered.contains(ADD_FAVORITE));
    }

    #[test]
    fn not_found_shows_the_details_message() {
        let favorites = store();
        let mut view = DetailsView::new(1);
        let request = view.mount();
        view.complete(&request, Err(CatalogError::DetailsUnavailable { status: 404 }));
        assert_eq!(view.render(&favorites), format!("Erro: {DETAILS_UNAVAILABLE}"));
    }

    #[test]
    fn toggle_flips_membership_and_label() {
        let favorites = store();
        let mut view = DetailsView::new(27205);
        let request = view.mount();
        view.complete(&request, Ok(inception()));

        assert_eq!(view.toggle_favorite(&favorites).unwrap(), Some(true));
        assert!(view.render(&favorites).contains(REMOVE_FAVORITE));
        assert_eq!(view.toggle_favorite(&favorites).unwrap(), Some(false));
        assert!(!favorites.contains(27205));
    }

    #[test]
    fn toggle_before_load_does_nothing() {
        let favorites = store();
        let mut view = DetailsView::new(27205);
        view.mount();
        assert_eq!(view.toggle_favorite(&favorites).unwrap(), None);
        assert!(favorites.is_empty());
    }
}
