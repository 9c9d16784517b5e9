//! TMDB API response types and request parameters.

use serde::{Deserialize, Deserializer, Serialize};

/// Base URL for poster images at the `w500` size.
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Base URL for movie pages on the TMDB website.
pub const MOVIE_PAGE_BASE_URL: &str = "https://www.themoviedb.org/movie";

// --- Movie lists ---

/// Response from the `search/movie` and `discover/movie` endpoints.
///
/// Both endpoints share the same paginated shape. A missing or `null`
/// `results` field decodes to an empty list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMovieListResponse {
    /// Current page number.
    #[serde(default)]
    pub page: u32,
    /// Movies on this page.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<TmdbMovie>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A single movie summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbMovie {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Poster image path (e.g. `/abc.jpg`), relative to the image CDN.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Vote average (0.0 - 10.0).
    #[serde(default)]
    pub vote_average: f64,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: String,
    /// Release date (YYYY-MM-DD, may be empty or missing).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
}

impl TmdbMovie {
    /// Returns the full `w500` poster URL, if the movie has a poster.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{POSTER_BASE_URL}{p}"))
    }

    /// Returns the TMDB website URL for this movie.
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("{MOVIE_PAGE_BASE_URL}/{}", self.id)
    }
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    #[allow(dead_code)]
    pub success: bool,
}

// --- Request Parameters ---

/// Parameters for the `search/movie` endpoint.
#[derive(Debug, Clone)]
pub struct SearchMovieParams {
    /// Search query (required).
    pub query: String,
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Include adult content.
    pub include_adult: bool,
}

impl SearchMovieParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: String::from("en-US"),
            page: 1,
            include_adult: false,
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets whether adult content is included.
    #[must_use]
    pub const fn include_adult(mut self, include_adult: bool) -> Self {
        self.include_adult = include_adult;
        self
    }
}

/// Parameters for the `discover/movie` endpoint.
#[derive(Debug, Clone)]
pub struct DiscoverMovieParams {
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Sort order (default: "popularity.desc").
    pub sort_by: String,
    /// Include adult content.
    pub include_adult: bool,
    /// Include video-only entries.
    pub include_video: bool,
}

impl Default for DiscoverMovieParams {
    fn default() -> Self {
        Self {
            language: String::from("en-US"),
            page: 1,
            sort_by: String::from("popularity.desc"),
            include_adult: false,
            include_video: false,
        }
    }
}

impl DiscoverMovieParams {
    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets whether adult content is included.
    #[must_use]
    pub const fn include_adult(mut self, include_adult: bool) -> Self {
        self.include_adult = include_adult;
        self
    }
}
