//! Search metrics CRUD operations.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// One row of the `search_metrics` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    /// Search term (primary key).
    pub search_term: String,
    /// Number of recorded searches.
    pub count: u64,
    /// TMDB ID of the top result when first recorded.
    pub movie_id: u64,
    /// Full poster URL of that result (may be empty).
    pub poster_url: String,
    /// Title of that result.
    pub title: String,
    /// RFC 3339 timestamp of the last recorded search.
    pub updated_at: String,
}

/// Records one search and returns the new count.
///
/// Inserts the row with `count = 1` when the term is new. Otherwise only
/// `count` and `updated_at` change; the first top result is kept.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn record_search(
    conn: &Connection,
    search_term: &str,
    movie_id: u64,
    poster_url: &str,
    title: &str,
    updated_at: &str,
) -> Result<u64> {
    conn.query_row(
        "INSERT INTO search_metrics (search_term, count, movie_id, poster_url, title, updated_at)
         VALUES (?1, 1, ?2, ?3, ?4, ?5)
         ON CONFLICT(search_term) DO UPDATE SET
            count = search_metrics.count + 1,
            updated_at = excluded.updated_at
         RETURNING count",
        rusqlite::params![search_term, movie_id, poster_url, title, updated_at],
        |row| row.get(0),
    )
    .with_context(|| format!("failed to record search {search_term:?}"))
}

/// Loads the `limit` most searched terms, highest count first.
///
/// Ties are broken by the most recent search, then alphabetically.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_trending(conn: &Connection, limit: u32) -> Result<Vec<MetricRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT search_term, count, movie_id, poster_url, title, updated_at
             FROM search_metrics
             ORDER BY count DESC, updated_at DESC, search_term ASC
             LIMIT ?1",
        )
        .context("failed to prepare trending query")?;

    let rows = stmt
        .query_map([limit], |row| {
            Ok(MetricRow {
                search_term: row.get(0)?,
                count: row.get(1)?,
                movie_id: row.get(2)?,
                poster_url: row.get(3)?,
                title: row.get(4)?,
                updated_at: row.get(5)?,
            })
        })
        .context("failed to query trending")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read search_metrics rows")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn record(conn: &Connection, term: &str, at: &str) -> u64 {
        record_search(conn, term, 1, "https://image.tmdb.org/t/p/w500/a.jpg", "Dune", at).unwrap()
    }

    #[test]
    fn test_record_new_term_starts_at_one() {
        // Arrange
        let conn = setup();

        // Act
        let count = record(&conn, "dune", "2024-10-01T00:00:00Z");

        // Assert
        assert_eq!(count, 1);
    }

    #[test]
    fn test_record_existing_term_increments() {
        // Arrange
        let conn = setup();
        record(&conn, "dune", "2024-10-01T00:00:00Z");

        // Act
        let count = record(&conn, "dune", "2024-10-02T00:00:00Z");

        // Assert
        assert_eq!(count, 2);
        let rows = load_trending(&conn, 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].updated_at, "2024-10-02T00:00:00Z");
    }

    #[test]
    fn test_record_keeps_first_top_result() {
        // Arrange
        let conn = setup();
        record_search(&conn, "dune", 438_631, "", "Dune", "2024-10-01T00:00:00Z").unwrap();

        // Act
        record_search(&conn, "dune", 693_134, "", "Dune: Part Two", "2024-10-02T00:00:00Z").unwrap();

        // Assert
        let rows = load_trending(&conn, 10).unwrap();
        assert_eq!(rows[0].movie_id, 438_631);
        assert_eq!(rows[0].title, "Dune");
    }

    #[test]
    fn test_load_trending_orders_by_count_and_limits() {
        // Arrange
        let conn = setup();
        record(&conn, "alien", "2024-10-01T00:00:00Z");
        for _ in 0..3 {
            record(&conn, "dune", "2024-10-01T00:00:00Z");
        }
        for _ in 0..2 {
            record(&conn, "inside out", "2024-10-01T00:00:00Z");
        }

        // Act
        let rows = load_trending(&conn, 2).unwrap();

        // Assert
        let terms: Vec<&str> = rows.iter().map(|r| r.search_term.as_str()).collect();
        assert_eq!(terms, vec!["dune", "inside out"]);
        assert_eq!(rows[0].count, 3);
    }

    #[test]
    fn test_load_trending_breaks_ties_by_recency() {
        // Arrange
        let conn = setup();
        record(&conn, "alien", "2024-10-01T00:00:00Z");
        record(&conn, "blade runner", "2024-10-03T00:00:00Z");

        // Act
        let rows = load_trending(&conn, 5).unwrap();

        // Assert
        assert_eq!(rows[0].search_term, "blade runner");
        assert_eq!(rows[1].search_term, "alien");
    }

    #[test]
    fn test_load_trending_empty() {
        // Arrange
        let conn = setup();

        // Act
        let rows = load_trending(&conn, 5).unwrap();

        // Assert
        assert!(rows.is_empty());
    }
}
