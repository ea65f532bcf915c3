use anyhow::Result;
use busca_filmes::config::Config;
use busca_filmes::favorites::FavoritesStore;
use busca_filmes::routes::Route;
use busca_filmes::shell::Shell;
use busca_filmes::storage::{FileStorage, KeyValueStorage};
use busca_filmes::tmdb::{CatalogApi, TmdbClient};
use dotenvy::dotenv;
use std::env;
use std::sync::Arc;
use tokio::io::{stdin, stdout, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Views are drawn on stdout; logs stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before building the filter so RUST_LOG can live there too.
    let dotenv_result = dotenv();
    init_tracing();
    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let config = Config::from_env();
    let catalog: Arc<dyn CatalogApi> = Arc::new(TmdbClient::from_config(&config)?);
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(config.data_dir.clone()));
    info!("Favorites stored under {:?}", config.data_dir);
    let favorites = Arc::new(FavoritesStore::initialize(storage));

    let start = env::args()
        .nth(1)
        .map(|path| Route::parse(&path))
        .unwrap_or(Route::Home);

    Shell::new(catalog, favorites)
        .run(start, BufReader::new(stdin()), stdout())
        .await
}
