use serde::{Deserialize, Serialize};

use super::ItemId;

/// Display metadata for a movie, keyed by the same id as the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: ItemId,
    pub title: String,
    pub year: Option<i32>,
    pub imdb_rating: Option<f32>,
    pub duration_minutes: Option<u32>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub lead_actor: Option<String>,
    pub keywords: Vec<String>,
}

// ============================================================================
// Metadata file types
// ============================================================================

/// Raw row of the semicolon-delimited metadata file
#[derive(Debug, Clone, Deserialize)]
pub struct MovieRecord {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "IMDb", default)]
    pub imdb: Option<String>,
    #[serde(rename = "Duration", default)]
    pub duration: Option<String>,
    #[serde(rename = "Director", default)]
    pub director: Option<String>,
    #[serde(rename = "Actor", default)]
    pub actor: Option<String>,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    #[serde(rename = "Keywords", default)]
    pub keywords: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_pipe(value: Option<String>) -> Vec<String> {
    non_empty(value)
        .map(|v| {
            v.split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl From<MovieRecord> for MovieDetails {
    fn from(record: MovieRecord) -> Self {
        MovieDetails {
            id: ItemId(record.id),
            title: record.title.trim().to_string(),
            year: non_empty(record.year).and_then(|y| y.parse().ok()),
            imdb_rating: non_empty(record.imdb).and_then(|r| r.parse().ok()),
            duration_minutes: non_empty(record.duration).and_then(|d| d.parse().ok()),
            genres: split_pipe(record.genre),
            director: non_empty(record.director),
            lead_actor: non_empty(record.actor),
            keywords: split_pipe(record.keywords),
        }
    }
}
