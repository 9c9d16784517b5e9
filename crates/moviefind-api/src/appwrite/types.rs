//! Appwrite document types and query builders.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::tmdb::TmdbMovie;

/// Attribute holding the recorded search term.
pub const SEARCH_TERM_ATTR: &str = "searchTerm";

/// Attribute holding the search counter.
pub const COUNT_ATTR: &str = "count";

/// A search-popularity document as returned by the trending list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingMovie {
    /// Document ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Search term this document counts.
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    /// Number of recorded searches.
    #[serde(default)]
    pub count: u64,
    /// TMDB ID of the top result when the term was first recorded.
    #[serde(default)]
    pub movie_id: u64,
    /// Full poster URL of that result (empty when it had no poster).
    #[serde(default)]
    pub poster_url: String,
    /// Title of that result.
    #[serde(default)]
    pub title: String,
}

/// Response from the list-documents endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList<T> {
    /// Total number of matching documents.
    #[serde(default)]
    pub total: u64,
    /// Documents on this page.
    #[serde(default = "Vec::new")]
    pub documents: Vec<T>,
}

/// Attributes written when a search term is seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSearchMetric {
    /// Search term.
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    /// Initial count (always 1).
    pub count: u64,
    /// TMDB ID of the top result.
    pub movie_id: u64,
    /// Full poster URL of the top result.
    pub poster_url: String,
    /// Title of the top result.
    pub title: String,
}

impl NewSearchMetric {
    /// Builds the first record for `search_term` from its top result.
    #[must_use]
    pub fn from_top_result(search_term: &str, movie: &TmdbMovie) -> Self {
        Self {
            search_term: String::from(search_term),
            count: 1,
            movie_id: movie.id,
            poster_url: movie.poster_url().unwrap_or_default(),
            title: movie.title.clone(),
        }
    }
}

/// Appwrite API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteErrorResponse {
    /// Error message.
    pub message: String,
    /// HTTP-like error code.
    #[serde(default)]
    pub code: u32,
    /// Error type identifier (e.g. `document_not_found`).
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A single Appwrite list query, serialized in the JSON query syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// `attribute == value`.
    Equal(&'static str, String),
    /// Order by `attribute` descending.
    OrderDesc(&'static str),
    /// Return at most `n` documents.
    Limit(u32),
}

impl Query {
    /// Serializes the query into the value of a `queries[]` parameter.
    #[must_use]
    pub fn to_param(&self) -> String {
        let value = match self {
            Self::Equal(attribute, value) => {
                json!({ "method": "equal", "attribute": attribute, "values": [value] })
            }
            Self::OrderDesc(attribute) => json!({ "method": "orderDesc", "attribute": attribute }),
            Self::Limit(n) => json!({ "method": "limit", "values": [n] }),
        };
        value.to_string()
    }
}
