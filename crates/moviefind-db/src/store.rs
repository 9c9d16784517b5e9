//! `LocalMetricsStore` - `SQLite` backed `MetricsApi`.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::{SecondsFormat, Utc};
use moviefind_api::appwrite::{MetricsApi, TrendingMovie};
use moviefind_api::tmdb::TmdbMovie;
use rusqlite::Connection;
use tracing::instrument;

use super::connection::open_db;
use super::metrics::{MetricRow, load_trending, record_search};

/// Search popularity store backed by the local database.
#[derive(Debug)]
pub struct LocalMetricsStore {
    /// Serialized access to the connection.
    conn: Mutex<Connection>,
}

impl LocalMetricsStore {
    /// Opens the store in the data directory (see `open_db`).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(dir: Option<&Path>) -> Result<Self> {
        let conn = open_db(dir).context("failed to open metrics database")?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already migrated connection.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs `f` with the locked connection.
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("metrics database lock poisoned"))?;
        f(&conn)
    }
}

impl From<MetricRow> for TrendingMovie {
    fn from(row: MetricRow) -> Self {
        Self {
            id: row.search_term.clone(),
            search_term: row.search_term,
            count: row.count,
            movie_id: row.movie_id,
            poster_url: row.poster_url,
            title: row.title,
        }
    }
}

impl MetricsApi for LocalMetricsStore {
    #[instrument(skip_all, fields(limit = limit))]
    async fn trending_movies(&self, limit: u32) -> Result<Vec<TrendingMovie>> {
        let rows = self.with_conn(|conn| load_trending(conn, limit))?;
        Ok(rows.into_iter().map(TrendingMovie::from).collect())
    }

    #[instrument(skip_all, fields(search_term = search_term))]
    async fn update_search_count(&self, search_term: &str, top_result: &TmdbMovie) -> Result<()> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let poster_url = top_result.poster_url().unwrap_or_default();
        let count = self.with_conn(|conn| {
            record_search(
                conn,
                search_term,
                top_result.id,
                &poster_url,
                &top_result.title,
                &now,
            )
        })?;
        tracing::debug!(count, "search count recorded locally");
        Ok(())
    }
}
