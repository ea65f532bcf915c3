use super::components::movie_grid;
use crate::favorites::FavoritesStore;
use crate::models::Movie;

pub const TITLE: &str = "Meus Filmes Favoritos";
pub const EMPTY: &str = "Sua lista de favoritos está vazia.";
const EMPTY_HINT: &str =
    "Adicione filmes com \"Adicionar aos Favoritos\" na página de detalhes de um filme.";

/// Lists the stored favorites. Refreshed from the store whenever it notifies.
#[derive(Debug, Default)]
pub struct FavoritesView {
    movies: Vec<Movie>,
}

impl FavoritesView {
    pub fn new(favorites: &FavoritesStore) -> Self {
        Self {
            movies: favorites.snapshot(),
        }
    }

    pub fn refresh(&mut self, movies: Vec<Movie>) {
        self.movies = movies;
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn render(&self) -> String {
        if self.movies.is_empty() {
            return format!("{TITLE}\n\n{EMPTY}\n{EMPTY_HINT}\nBuscar Filmes [/]");
        }
        format!("{TITLE}\n\n{}", movie_grid(&self.movies))
    }
}
