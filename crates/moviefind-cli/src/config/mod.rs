//! Application configuration module.
//!
//! Manages the TOML config file holding TMDB request options, the search
//! quiet period, the trending list size and the popularity backend.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, AppwriteConfig, MetricsBackendKind};
pub use paths::resolve_config_path;
