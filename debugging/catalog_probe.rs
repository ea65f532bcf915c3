//! Query the catalog through the app's client and print what it maps.
//! Usage:
//!   cargo run --bin catalog_probe -- popular [page]
//!   cargo run --bin catalog_probe -- search <query> [page]
//!   cargo run --bin catalog_probe -- movie <tmdb_id>
//! Reads TMDB_API_KEY, TMDB_BASE_URL and TMDB_LANGUAGE (.env supported).

use anyhow::{Context, Result};
use busca_filmes::config::Config;
use busca_filmes::models::{Movie, MoviePage};
use busca_filmes::tmdb::{poster_url, CatalogApi, TmdbClient};
use dotenvy::dotenv;
use serde_json::json;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Probe {
    Popular,
    Search,
    Movie,
}

impl FromStr for Probe {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "popular" => Ok(Probe::Popular),
            "search" => Ok(Probe::Search),
            "movie" => Ok(Probe::Movie),
            _ => Err(anyhow::anyhow!("probe must be 'popular', 'search' or 'movie'")),
        }
    }
}

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin catalog_probe -- popular [page]");
    eprintln!("       cargo run --bin catalog_probe -- search <query> [page]");
    eprintln!("       cargo run --bin catalog_probe -- movie <tmdb_id>");
    std::process::exit(1);
}

fn parse_page(arg: Option<&String>) -> Result<u32> {
    arg.map(|p| p.parse::<u32>().context("page must be a positive integer"))
        .transpose()
        .map(|p| p.unwrap_or(1))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let probe = Probe::from_str(&args[1])?;
    let config = Config::from_env();
    let client = TmdbClient::from_config(&config)?;

    match probe {
        Probe::Popular => {
            let page = parse_page(args.get(2))?;
            print_page(&client.fetch_popular(page).await?);
        }
        Probe::Search => {
            let Some(query) = args.get(2) else { usage() };
            let page = parse_page(args.get(3))?;
            match client.search_movies(query, page).await? {
                Some(result) => print_page(&result),
                None => println!("blank query, nothing requested"),
            }
        }
        Probe::Movie => {
            let Some(raw_id) = args.get(2) else { usage() };
            let id: i64 = raw_id.parse().context("tmdb_id must be an integer")?;
            let movie = client.fetch_movie_details(id).await?;
            println!("{}", serde_json::to_string_pretty(&mapped(&movie))?);
        }
    }

    Ok(())
}

fn mapped(movie: &Movie) -> serde_json::Value {
    json!({
        "id": movie.id,
        "title": movie.title,
        "tagline": movie.tagline(),
        "year": movie.year(),
        "release_date": movie.release_date.map(|d| d.format("%d/%m/%Y").to_string()),
        "vote_average": format!("{:.1}", movie.vote_average),
        "genres": movie.genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
        "poster": poster_url(movie.poster_path.as_deref()),
        "overview": movie.overview,
    })
}

fn print_page(page: &MoviePage) {
    println!(
        "page {} of {} ({} results total, {} on this page)",
        page.page,
        page.total_pages,
        page.total_results,
        page.results.len()
    );
    for movie in &page.results {
        let year = movie
            .year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        println!("{:>8}  {} ({})", movie.id, movie.title, year);
    }
}
