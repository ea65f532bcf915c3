use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A movie as the catalog returns it. List endpoints leave `genres` and
/// `tagline` empty; the detail endpoint fills them in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<Genre>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// One page of a paginated list or search response.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MoviePage {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl Movie {
    pub fn year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.release_date.map(|d| d.year())
    }

    pub fn tagline(&self) -> Option<&str> {
        self.tagline.as_deref().filter(|t| !t.trim().is_empty())
    }
}

// TMDB sends "" for unknown dates.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_list_summary_without_genres() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 27205,
            "title": "A Origem",
            "overview": "Dom Cobb é um ladrão.",
            "release_date": "2010-07-15",
            "poster_path": "/poster.jpg",
            "vote_average": 8.369,
            "genre_ids": [28, 878],
            "adult": false
        }))
        .unwrap();
        assert_eq!(movie.id, 27205);
        assert_eq!(movie.year(), Some(2010));
        assert!(movie.genres.is_empty());
        assert_eq!(movie.tagline(), None);
    }

    #[test]
    fn empty_release_date_maps_to_none() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 1,
            "title": "Sem data",
            "release_date": "",
            "poster_path": null
        }))
        .unwrap();
        assert_eq!(movie.release_date, None);
        assert_eq!(movie.poster_path, None);
        assert_eq!(movie.year(), None);
    }

    #[test]
    fn blank_tagline_is_hidden() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 2,
            "title": "Qualquer",
            "tagline": "  "
        }))
        .unwrap();
        assert_eq!(movie.tagline(), None);
    }
}
