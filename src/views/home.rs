use tracing::{debug, warn};

use super::components::{movie_grid, pagination, BRAND};
use super::{RequestGeneration, Ticket};
use crate::models::{Movie, MoviePage};
use crate::tmdb::{CatalogApi, CatalogError};

pub const POPULAR_FAILED: &str = "Não foi possível carregar os filmes populares.";
pub const LOADING: &str = "Carregando...";
pub const NO_RESULTS: &str = "Nenhum filme encontrado. Tente buscar por algo!";
/// Cards shown per page, out of the up to 20 the catalog returns.
pub const CARDS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeRequest {
    Popular { page: u32 },
    Search { query: String, page: u32 },
}

impl HomeRequest {
    /// Popular results are wrapped in `Some` so both kinds share one shape.
    pub async fn execute(
        &self,
        catalog: &dyn CatalogApi,
    ) -> Result<Option<MoviePage>, CatalogError> {
        match self {
            HomeRequest::Popular { page } => catalog.fetch_popular(*page).await.map(Some),
            HomeRequest::Search { query, page } => catalog.search_movies(query, *page).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub ticket: Ticket,
    pub request: HomeRequest,
}

/// Result of a pager action. The view always scrolls back to the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChange {
    pub scroll_to_top: bool,
    pub request: Option<PendingRequest>,
}

/// Browse and search page.
#[derive(Debug, Default)]
pub struct HomeView {
    movies: Vec<Movie>,
    search_input: String,
    loading: bool,
    error: Option<String>,
    current_page: u32,
    total_pages: u32,
    current_search: Option<String>,
    generation: RequestGeneration,
}

impl HomeView {
    pub fn new() -> Self {
        Self {
            current_page: 1,
            ..Self::default()
        }
    }

    /// First render: the popular list, page 1.
    pub fn mount(&mut self) -> PendingRequest {
        self.begin(HomeRequest::Popular { page: 1 })
    }

    pub fn set_search_input(&mut self, text: &str) {
        self.search_input = text.to_string();
    }

    /// Commits a search for `term`. Blank terms do nothing.
    pub fn submit_search(&mut self, term: &str) -> Option<PendingRequest> {
        let term = term.trim();
        if term.is_empty() {
            debug!("Ignoring blank search");
            return None;
        }
        self.search_input = term.to_string();
        self.current_search = Some(term.to_string());
        Some(self.begin(HomeRequest::Search {
            query: term.to_string(),
            page: 1,
        }))
    }

    pub fn change_page(&mut self, page: u32) -> PageChange {
        let in_range = page >= 1 && page <= self.total_pages;
        let request = if in_range {
            let request = match &self.current_search {
                Some(query) => HomeRequest::Search {
                    query: query.clone(),
                    page,
                },
                None => HomeRequest::Popular { page },
            };
            Some(self.begin(request))
        } else {
            debug!(page, total = self.total_pages, "Page out of range");
            None
        };
        PageChange {
            scroll_to_top: true,
            request,
        }
    }

    pub fn next_page(&mut self) -> PageChange {
        self.change_page(self.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> PageChange {
        self.change_page(self.current_page.saturating_sub(1))
    }

    fn begin(&mut self, request: HomeRequest) -> PendingRequest {
        self.loading = true;
        self.error = None;
        PendingRequest {
            ticket: self.generation.issue(),
            request,
        }
    }

    /// Applies a finished request. Returns false when a newer request has
    /// been issued since, in which case nothing changes.
    pub fn complete(
        &mut self,
        pending: &PendingRequest,
        outcome: Result<Option<MoviePage>, CatalogError>,
    ) -> bool {
        if !self.generation.is_current(pending.ticket) {
            debug!(request = ?pending.request, "Discarding stale result");
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(Some(page)) => {
                self.current_page = page.page;
                self.total_pages = page.total_pages;
                self.movies = page.results;
            }
            Ok(None) => {}
            Err(e) => match &pending.request {
                HomeRequest::Popular { page } => {
                    warn!("Popular list page {} failed: {:?}", page, e);
                    self.error = Some(POPULAR_FAILED.to_string());
                }
                HomeRequest::Search { query, page } => {
                    warn!("Search '{}' page {} failed: {:?}", query, page, e);
                    self.error = Some(e.to_string());
                    self.movies.clear();
                }
            },
        }
        true
    }

    pub fn visible_movies(&self) -> &[Movie] {
        let end = self.movies.len().min(CARDS_PER_PAGE);
        &self.movies[..end]
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn current_search(&self) -> Option<&str> {
        self.current_search.as_deref()
    }

    pub fn render(&self) -> String {
        let mut sections = vec![
            BRAND.to_string(),
            format!("Buscar: [{}]", self.search_input),
        ];
        if self.loading {
            sections.push(LOADING.to_string());
        }
        if let Some(error) = &self.error {
            sections.push(format!("Erro: {error}"));
        }
        if !self.loading {
            if self.movies.is_empty() {
                if self.error.is_none() {
                    sections.push(NO_RESULTS.to_string());
                }
            } else {
                sections.push(movie_grid(self.visible_movies()));
            }
            if let Some(pager) = pagination(self.current_page, self.total_pages) {
                sections.push(pager);
            }
        }
        sections.join("\n\n")
    }
}
