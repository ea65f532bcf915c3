use std::fmt;

use crate::tmdb::parse_tmdb_id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    MovieDetails(i64),
    Favorites,
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let without_query = trimmed.split(['?', '#']).next().unwrap_or_default();
        let normalized = without_query.trim_end_matches('/');
        match normalized {
            "" => Route::Home,
            "/favorites" => Route::Favorites,
            other => other
                .strip_prefix("/movie/")
                .and_then(parse_tmdb_id)
                .map(Route::MovieDetails)
                .unwrap_or_else(|| Route::NotFound(trimmed.to_string())),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::MovieDetails(id) => format!("/movie/{id}"),
            Route::Favorites => "/favorites".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
