//! Movie card presentation.

use chrono::{Datelike, NaiveDate};
use moviefind_api::tmdb::TmdbMovie;

/// Placeholder shown when a movie has no poster.
pub const NO_POSTER: &str = "(no poster)";

/// Placeholder for a missing year.
const NOT_AVAILABLE: &str = "N/A";

/// Display strings for one movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieCard {
    /// Movie title.
    pub title: String,
    /// Full poster URL or [`NO_POSTER`].
    pub poster: String,
    /// Rating with one decimal.
    pub rating: String,
    /// Original language code.
    pub language: String,
    /// Release year or `N/A`.
    pub year: String,
}

impl MovieCard {
    /// Builds the card for `movie`.
    #[must_use]
    pub fn from_movie(movie: &TmdbMovie) -> Self {
        Self {
            title: movie.title.clone(),
            poster: movie
                .poster_url()
                .unwrap_or_else(|| String::from(NO_POSTER)),
            rating: format!("{:.1}", movie.vote_average),
            language: movie.original_language.clone(),
            year: release_year(movie.release_date.as_deref())
                .map_or_else(|| String::from(NOT_AVAILABLE), |y| y.to_string()),
        }
    }
}

/// Extracts the year from a `YYYY-MM-DD` release date.
fn release_year(release_date: Option<&str>) -> Option<i32> {
    let date = release_date?.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}
