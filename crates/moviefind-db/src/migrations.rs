//! Schema version management using `PRAGMA user_version`.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version.
const CURRENT_VERSION: u32 = 1;

/// Runs database migrations up to `CURRENT_VERSION`.
///
/// # Errors
///
/// Returns an error if any SQL statement fails.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version")?;

    if version < 1 {
        migrate_v1(conn).context("migration to v1 failed")?;
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)
        .context("failed to update user_version")?;

    Ok(())
}

/// Migration to v1: create the `search_metrics` table.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS search_metrics (
            search_term  TEXT PRIMARY KEY,
            count        INTEGER NOT NULL DEFAULT 1,
            movie_id     INTEGER NOT NULL,
            poster_url   TEXT NOT NULL DEFAULT '',
            title        TEXT NOT NULL DEFAULT '',
            updated_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_search_metrics_count ON search_metrics(count DESC);",
    )
    .context("failed to create search_metrics table")?;

    Ok(())
}
