//! `MetricsApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::TrendingMovie;
use crate::tmdb::TmdbMovie;

/// Search popularity store.
///
/// Implemented by the Appwrite client and by the local `SQLite` store so the
/// controller can run against either. Uses `trait_variant::make` to generate
/// a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MetricsApi: Send)]
pub trait LocalMetricsApi {
    /// Lists the most searched terms, highest count first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn trending_movies(&self, limit: u32) -> Result<Vec<TrendingMovie>>;

    /// Records one search for `search_term`.
    ///
    /// Increments the counter of an existing record, or creates one from
    /// `top_result` with a count of 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or the write fails.
    async fn update_search_count(&self, search_term: &str, top_result: &TmdbMovie) -> Result<()>;
}
