//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::Result;
use moviefind_db::xdg_base_dir;

/// Config file name, both under `--dir` and under the user config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns `{dir}/config.toml`, or `$XDG_CONFIG_HOME/moviefind/config.toml`
/// (default `~/.config/moviefind/config.toml`) when no `--dir` is given.
///
/// With `--dir`, config and the local metrics database share one directory.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&Path>) -> Result<PathBuf> {
    let base = match dir {
        Some(d) => d.to_path_buf(),
        None => xdg_base_dir("XDG_CONFIG_HOME", ".config")?.join("moviefind"),
    };
    Ok(base.join(CONFIG_FILE_NAME))
}
