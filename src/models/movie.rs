//! Movie metadata keyed by title and release year.

use serde::{Deserialize, Serialize};

/// Build the lookup key for a movie: `"<title> (<year>)"`.
///
/// The year is part of the key because titles are reused across remakes.
pub fn movie_key(title: &str, year: &str) -> String {
    format!("{} ({})", title.trim(), year)
}

/// General information about one movie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieInfo {
    pub title: String,
    pub year: String,
    /// Production company (may list several, comma separated)
    #[serde(rename = "prod_co")]
    pub production_company: String,
    pub director: String,
    pub actor1: String,
    pub actor2: String,
    pub actor3: String,
}

impl MovieInfo {
    /// Key under which this movie is stored
    pub fn key(&self) -> String {
        movie_key(&self.title, &self.year)
    }
}
