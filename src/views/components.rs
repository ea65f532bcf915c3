//! Presentational pieces shared by the pages.

use chrono::{Datelike, Local};

use crate::models::Movie;
use crate::tmdb::poster_url;

pub const BRAND: &str = "Busca Filmes +praTi";
const RULE: &str = "────────────────────────────────────────────────────────────";
const CREDIT: &str = "Desenvolvido por Marcelo Giulian";
const GITHUB_URL: &str = "https://github.com/mgbmoura";
const LINKEDIN_URL: &str = "https://www.linkedin.com/in/marcelo-giulian";

pub fn header() -> String {
    format!("{BRAND}{:>width$}\n{RULE}", "Favoritos [/favorites]", width = 60 - BRAND.chars().count())
}

pub fn footer() -> String {
    footer_for_year(Local::now().year())
}

pub fn footer_for_year(year: i32) -> String {
    format!("{RULE}\n© {year} - {CREDIT}\nGitHub: {GITHUB_URL} | LinkedIn: {LINKEDIN_URL}")
}

pub fn movie_link(movie: &Movie) -> String {
    format!("/movie/{}", movie.id)
}

/// `index` is the 1-based number the user types to open the card.
pub fn movie_card(index: usize, movie: &Movie) -> String {
    let year = movie
        .year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "[{index}] {} ({year})\n    {} | {}",
        movie.title,
        movie_link(movie),
        poster_url(movie.poster_path.as_deref())
    )
}

pub fn movie_grid(movies: &[Movie]) -> String {
    movies
        .iter()
        .enumerate()
        .map(|(i, m)| movie_card(i + 1, m))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hidden when there is at most one page.
pub fn pagination(current_page: u32, total_pages: u32) -> Option<String> {
    if total_pages <= 1 {
        return None;
    }
    let prev = if current_page <= 1 {
        "(« Anterior)"
    } else {
        "« Anterior"
    };
    let next = if current_page >= total_pages {
        "(Próximo »)"
    } else {
        "Próximo »"
    };
    Some(format!(
        "{prev}   Página {current_page} de {total_pages}   {next}"
    ))
}

pub fn frame(body: &str, notice: Option<&str>) -> String {
    let mut out = header();
    if let Some(notice) = notice {
        out.push('\n');
        out.push_str(&format!("! {notice}"));
    }
    out.push_str("\n\n");
    out.push_str(body.trim_end());
    out.push_str("\n\n");
    out.push_str(&footer());
    out.push('\n');
    out
}
