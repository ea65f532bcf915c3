//! Navigation shell: maps routes to views, wraps them in the header/footer
//! frame and drives the interactive loop.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::favorites::FavoritesStore;
use crate::models::{Movie, MoviePage};
use crate::routes::Route;
use crate::tmdb::{CatalogApi, CatalogError};
use crate::views::components::frame;
use crate::views::{DetailsRequest, DetailsView, FavoritesView, HomeView, PageChange, PendingRequest};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const PROMPT: &str = "> ";
const SAVE_FAILED: &str =
    "Não foi possível salvar os favoritos; a alteração vale apenas nesta sessão.";
const DEGRADED: &str = "Os favoritos salvos no disco não puderam ser lidos ou gravados.";
const PAGING_ONLY_ON_HOME: &str = "A paginação só está disponível na página de busca.";
const FAVORITE_ONLY_ON_DETAILS: &str = "Abra a página de um filme para favoritá-lo.";
const HELP: &str = "\
Comandos:
  /  /favorites  /movie/<id>   navega para a página
  buscar <termo>               busca filmes pelo título
  proxima | anterior           muda de página
  pagina <n>                   vai para a página n
  abrir <n>                    abre o n-ésimo filme da lista
  favoritar                    adiciona ou remove o filme aberto dos favoritos
  favoritos | inicio           atalhos de navegação
  ajuda | sair";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Navigate(Route),
    Search(String),
    NextPage,
    PreviousPage,
    Page(u32),
    Open(usize),
    ToggleFavorite,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line.starts_with('/') {
            return Some(Command::Navigate(Route::parse(line)));
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word.to_lowercase().as_str() {
            "buscar" | "search" => Command::Search(rest.to_string()),
            "proxima" | "próxima" | "next" => Command::NextPage,
            "anterior" | "prev" => Command::PreviousPage,
            "pagina" | "página" | "page" => match rest.parse() {
                Ok(page) => Command::Page(page),
                Err(_) => Command::Unknown(line.to_string()),
            },
            "abrir" | "open" => match rest.parse::<usize>() {
                Ok(index) if index >= 1 => Command::Open(index),
                _ => Command::Unknown(line.to_string()),
            },
            "favoritar" | "fav" => Command::ToggleFavorite,
            "favoritos" | "favorites" => Command::Navigate(Route::Favorites),
            "inicio" | "início" | "home" | "voltar" | "back" => Command::Navigate(Route::Home),
            "ajuda" | "help" | "?" => Command::Help,
            "sair" | "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        };
        Some(command)
    }
}

#[derive(Debug)]
pub enum View {
    Home(HomeView),
    Details(DetailsView),
    Favorites(FavoritesView),
    NotFound(String),
}

/// A catalog request to run off the input loop.
#[derive(Debug, Clone)]
pub enum Job {
    Home(PendingRequest),
    Details(DetailsRequest),
}

#[derive(Debug)]
pub enum Completion {
    Home(PendingRequest, Result<Option<MoviePage>, CatalogError>),
    Details(DetailsRequest, Result<Movie, CatalogError>),
}

impl Job {
    pub async fn run(self, catalog: &dyn CatalogApi) -> Completion {
        match self {
            Job::Home(pending) => {
                let outcome = pending.request.execute(catalog).await;
                Completion::Home(pending, outcome)
            }
            Job::Details(request) => {
                let outcome = request.execute(catalog).await;
                Completion::Details(request, outcome)
            }
        }
    }
}

/// What the loop has to do after a command.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub jobs: Vec<Job>,
    pub scroll_to_top: bool,
    pub quit: bool,
}

impl Dispatch {
    fn job(job: Job) -> Self {
        Self {
            jobs: vec![job],
            ..Self::default()
        }
    }

    fn from_page_change(change: PageChange) -> Self {
        Self {
            jobs: change.request.map(Job::Home).into_iter().collect(),
            scroll_to_top: change.scroll_to_top,
            quit: false,
        }
    }
}

pub struct Shell {
    catalog: Arc<dyn CatalogApi>,
    favorites: Arc<FavoritesStore>,
    route: Route,
    view: View,
    notice: Option<String>,
}

impl Shell {
    pub fn new(catalog: Arc<dyn CatalogApi>, favorites: Arc<FavoritesStore>) -> Self {
        Self {
            catalog,
            favorites,
            route: Route::Home,
            view: View::Home(HomeView::new()),
            notice: None,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn favorites(&self) -> &Arc<FavoritesStore> {
        &self.favorites
    }

    /// Replaces the current view. Transient state of the previous view is
    /// dropped, and any of its in-flight requests become stale.
    pub fn navigate(&mut self, route: Route) -> Dispatch {
        info!("Navigating to {}", route);
        self.route = route.clone();
        match route {
            Route::Home => {
                let mut home = HomeView::new();
                let pending = home.mount();
                self.view = View::Home(home);
                Dispatch::job(Job::Home(pending))
            }
            Route::MovieDetails(id) => {
                let mut details = DetailsView::new(id);
                let request = details.mount();
                self.view = View::Details(details);
                Dispatch::job(Job::Details(request))
            }
            Route::Favorites => {
                self.view = View::Favorites(FavoritesView::new(&self.favorites));
                Dispatch::default()
            }
            Route::NotFound(path) => {
                self.view = View::NotFound(path);
                Dispatch::default()
            }
        }
    }

    pub fn dispatch(&mut self, command: Command) -> Dispatch {
        self.notice = None;
        debug!(?command, "Dispatching");
        match command {
            Command::Navigate(route) => self.navigate(route),
            Command::Search(term) => self.search(&term),
            Command::NextPage => self.page_change(HomeView::next_page),
            Command::PreviousPage => self.page_change(HomeView::previous_page),
            Command::Page(page) => self.page_change(|home| home.change_page(page)),
            Command::Open(index) => self.open(index),
            Command::ToggleFavorite => {
                self.toggle_favorite();
                Dispatch::default()
            }
            Command::Help => {
                self.notice = Some(HELP.to_string());
                Dispatch::default()
            }
            Command::Quit => Dispatch {
                quit: true,
                ..Dispatch::default()
            },
            Command::Unknown(input) => {
                self.notice = Some(format!("Comando desconhecido: {input} (digite \"ajuda\")"));
                Dispatch::default()
            }
        }
    }

    fn search(&mut self, term: &str) -> Dispatch {
        if let View::Home(home) = &mut self.view {
            home.set_search_input(term);
            return match home.submit_search(term) {
                Some(pending) => Dispatch::job(Job::Home(pending)),
                None => Dispatch::default(),
            };
        }
        // Searching from another page lands on the home page with the results.
        self.route = Route::Home;
        let mut home = HomeView::new();
        home.set_search_input(term);
        let pending = home.submit_search(term).unwrap_or_else(|| home.mount());
        self.view = View::Home(home);
        Dispatch::job(Job::Home(pending))
    }

    fn page_change<F>(&mut self, change: F) -> Dispatch
    where
        F: FnOnce(&mut HomeView) -> PageChange,
    {
        match &mut self.view {
            View::Home(home) => Dispatch::from_page_change(change(home)),
            _ => {
                self.notice = Some(PAGING_ONLY_ON_HOME.to_string());
                Dispatch::default()
            }
        }
    }

    fn open(&mut self, index: usize) -> Dispatch {
        let listed = match &self.view {
            View::Home(home) => home.visible_movies(),
            View::Favorites(favorites) => favorites.movies(),
            _ => &[],
        };
        match index.checked_sub(1).and_then(|i| listed.get(i)) {
            Some(movie) => {
                let id = movie.id;
                self.navigate(Route::MovieDetails(id))
            }
            None => {
                self.notice = Some(format!("Nenhum filme na posição {index}."));
                Dispatch::default()
            }
        }
    }

    fn toggle_favorite(&mut self) {
        let View::Details(details) = &self.view else {
            self.notice = Some(FAVORITE_ONLY_ON_DETAILS.to_string());
            return;
        };
        match details.toggle_favorite(&self.favorites) {
            Ok(Some(added)) => debug!(movie_id = details.movie_id(), added, "Favorite toggled"),
            Ok(None) => {}
            Err(e) => {
                warn!("Favorite toggle was not persisted: {}", e);
                self.notice = Some(SAVE_FAILED.to_string());
            }
        }
    }

    /// Applies a finished request to the current view. Returns false when the
    /// result was stale or belonged to a view that is gone.
    pub fn apply(&mut self, completion: Completion) -> bool {
        match (&mut self.view, completion) {
            (View::Home(home), Completion::Home(pending, outcome)) => {
                home.complete(&pending, outcome)
            }
            (View::Details(details), Completion::Details(request, outcome)) => {
                details.complete(&request, outcome)
            }
            (_, completion) => {
                debug!(?completion, "Dropping result for a view that is gone");
                false
            }
        }
    }

    /// Returns true when the current view shows the favorites and must be
    /// re-rendered.
    pub fn on_favorites_changed(&mut self, movies: Vec<Movie>) -> bool {
        match &mut self.view {
            View::Favorites(view) => {
                view.refresh(movies);
                true
            }
            View::Details(_) => true,
            _ => false,
        }
    }

    /// Runs the jobs one after another and applies their results. Used for
    /// scripted sessions where ordering must be deterministic.
    pub async fn settle(&mut self, dispatch: Dispatch) {
        for job in dispatch.jobs {
            let completion = job.run(self.catalog.as_ref()).await;
            self.apply(completion);
        }
    }

    pub fn render(&self) -> String {
        let body = match &self.view {
            View::Home(home) => home.render(),
            View::Details(details) => details.render(&self.favorites),
            View::Favorites(favorites) => favorites.render(),
            View::NotFound(path) => format!("Página não encontrada: {path}"),
        };
        let notice = self
            .notice
            .as_deref()
            .or_else(|| self.favorites.is_degraded().then_some(DEGRADED));
        frame(&body, notice)
    }

    fn spawn_jobs(&self, jobs: Vec<Job>, tx: &mpsc::UnboundedSender<Completion>) {
        for job in jobs {
            let catalog = self.catalog.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let completion = job.run(catalog.as_ref()).await;
                // The loop may already have exited.
                let _ = tx.send(completion);
            });
        }
    }

    async fn draw<W>(&self, out: &mut W, clear: bool) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut frame = String::new();
        if clear {
            frame.push_str(CLEAR_SCREEN);
        }
        frame.push_str(&self.render());
        frame.push_str(PROMPT);
        out.write_all(frame.as_bytes())
            .await
            .context("Failed to write frame")?;
        out.flush().await.context("Failed to flush output")?;
        Ok(())
    }

    /// Interactive loop. Catalog requests run on spawned tasks; their results
    /// come back over a channel and go through each view's staleness check.
    pub async fn run<R, W>(mut self, start: Route, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
        let mut favorites_rx = self.favorites.subscribe();
        let mut lines = input.lines();

        let initial = self.navigate(start);
        self.spawn_jobs(initial.jobs, &tx);
        self.draw(&mut output, true).await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read input")? else {
                        info!("Input closed");
                        break;
                    };
                    let Some(command) = Command::parse(&line) else {
                        self.draw(&mut output, false).await?;
                        continue;
                    };
                    let dispatch = self.dispatch(command);
                    if dispatch.quit {
                        break;
                    }
                    self.spawn_jobs(dispatch.jobs, &tx);
                    self.draw(&mut output, dispatch.scroll_to_top).await?;
                }
                Some(completion) = rx.recv() => {
                    if self.apply(completion) {
                        self.draw(&mut output, false).await?;
                    }
                }
                Ok(()) = favorites_rx.changed() => {
                    let movies = favorites_rx.borrow_and_update().clone();
                    if self.on_favorites_changed(movies) {
                        self.draw(&mut output, false).await?;
                    }
                }
                Ok(()) = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received (Ctrl+C)");
                    break;
                }
            }
        }
        output
            .write_all("\nAté logo!\n".as_bytes())
            .await
            .context("Failed to write farewell")?;
        output.flush().await.context("Failed to flush output")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_in_both_languages() {
        assert_eq!(Command::parse("   "), None);
        assert_eq!(
            Command::parse("/movie/27205"),
            Some(Command::Navigate(Route::MovieDetails(27205)))
        );
        assert_eq!(
            Command::parse("buscar  O Poderoso Chefão "),
            Some(Command::Search("O Poderoso Chefão".to_string()))
        );
        assert_eq!(Command::parse("search"), Some(Command::Search(String::new())));
        assert_eq!(Command::parse("próxima"), Some(Command::NextPage));
        assert_eq!(Command::parse("prev"), Some(Command::PreviousPage));
        assert_eq!(Command::parse("pagina 3"), Some(Command::Page(3)));
        assert_eq!(Command::parse("abrir 2"), Some(Command::Open(2)));
        assert_eq!(Command::parse("FAV"), Some(Command::ToggleFavorite));
        assert_eq!(
            Command::parse("favoritos"),
            Some(Command::Navigate(Route::Favorites))
        );
        assert_eq!(Command::parse("voltar"), Some(Command::Navigate(Route::Home)));
        assert_eq!(Command::parse("sair"), Some(Command::Quit));
    }

    #[test]
    fn rejects_malformed_arguments() {
        assert_eq!(
            Command::parse("abrir 0"),
            Some(Command::Unknown("abrir 0".to_string()))
        );
        assert_eq!(
            Command::parse("pagina x"),
            Some(Command::Unknown("pagina x".to_string()))
        );
        assert_eq!(
            Command::parse("dançar"),
            Some(Command::Unknown("dançar".to_string()))
        );
    }
}
