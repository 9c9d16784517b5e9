//! Database connection management.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations::run_migrations;

/// Database file name inside the data directory.
const DB_FILE_NAME: &str = "moviefind.db";

/// Resolves a per-user base directory following the XDG convention.
///
/// Returns `$var` when it holds an absolute path, otherwise `$HOME/{fallback}`.
///
/// # Errors
///
/// Returns an error if `$var` is unusable and `HOME` is not set.
pub fn xdg_base_dir(var: &str, fallback: &str) -> Result<PathBuf> {
    base_dir_from(std::env::var_os(var), std::env::var_os("HOME"), fallback)
}

fn base_dir_from(
    xdg: Option<OsString>,
    home: Option<OsString>,
    fallback: &str,
) -> Result<PathBuf> {
    if let Some(path) = xdg.map(PathBuf::from).filter(|p| p.is_absolute()) {
        return Ok(path);
    }
    let home = home
        .filter(|h| !h.is_empty())
        .context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home).join(fallback))
}

/// Resolves the data directory.
///
/// - If `dir` is `Some`, returns it unchanged.
/// - Otherwise returns `$XDG_DATA_HOME/moviefind` (default `~/.local/share/moviefind`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_data_dir(dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.to_path_buf());
    }
    Ok(xdg_base_dir("XDG_DATA_HOME", ".local/share")?.join("moviefind"))
}

/// Opens (or creates) the database and runs migrations.
///
/// The file is `{data_dir}/moviefind.db`, see [`resolve_data_dir`].
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrations fail.
pub fn open_db(dir: Option<&Path>) -> Result<Connection> {
    let data_dir = resolve_data_dir(dir)?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create directory {}", data_dir.display()))?;

    let db_path = data_dir.join(DB_FILE_NAME);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    run_migrations(&conn).context("database migration failed")?;

    tracing::debug!(path = %db_path.display(), "database opened");
    Ok(conn)
}
