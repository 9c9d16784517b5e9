//! `AppConfig` struct and TOML loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB request options.
    #[serde(default)]
    pub tmdb: TmdbConfig,
    /// Search input options.
    #[serde(default)]
    pub search: SearchConfig,
    /// Trending list options.
    #[serde(default)]
    pub trending: TrendingConfig,
    /// Popularity backend selection.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Appwrite document store settings.
    #[serde(default)]
    pub appwrite: AppwriteConfig,
}

/// TMDB request options.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TmdbConfig {
    /// Response language.
    pub language: String,
    /// Include adult content.
    pub include_adult: bool,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            language: String::from("en-US"),
            include_adult: false,
        }
    }
}

/// Search input options.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period in milliseconds before a search fires.
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 600 }
    }
}

/// Trending list options.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrendingConfig {
    /// Number of trending entries shown.
    pub limit: u32,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self { limit: 5 }
    }
}

/// Where search popularity is recorded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricsBackendKind {
    /// Hosted Appwrite collection.
    #[default]
    Appwrite,
    /// Local `SQLite` database.
    Local,
    /// Nothing is recorded; the trending list stays empty.
    Disabled,
}

/// Popularity backend selection.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Backend kind.
    pub backend: MetricsBackendKind,
}

/// Appwrite document store settings. The API key comes from `APPWRITE_API_KEY`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppwriteConfig {
    /// API endpoint.
    pub endpoint: String,
    /// Project ID.
    pub project_id: String,
    /// Database ID.
    pub database_id: String,
    /// Collection ID of the search metrics.
    pub collection_id: String,
}

impl Default for AppwriteConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("https://cloud.appwrite.io/v1/"),
            project_id: String::new(),
            database_id: String::new(),
            collection_id: String::new(),
        }
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Search quiet period.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert_eq!(config.tmdb.language, "en-US");
        assert!(!config.tmdb.include_adult);
        assert_eq!(config.debounce(), Duration::from_millis(600));
        assert_eq!(config.trending.limit, 5);
        assert_eq!(config.metrics.backend, MetricsBackendKind::Appwrite);
        assert_eq!(config.appwrite.endpoint, "https://cloud.appwrite.io/v1/");
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_partial_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[search]\ndebounce_ms = 250\n\n[metrics]\nbackend = \"local\"\n",
        )
        .unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.metrics.backend, MetricsBackendKind::Local);
        assert_eq!(config.tmdb, TmdbConfig::default());
        assert_eq!(config.trending.limit, 5);
    }

    #[test]
    fn test_load_full_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[tmdb]
language = "ja-JP"
include_adult = true

[trending]
limit = 10

[metrics]
backend = "disabled"

[appwrite]
endpoint = "https://appwrite.example.com/v1/"
project_id = "proj"
database_id = "db"
collection_id = "metrics"
"#,
        )
        .unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.tmdb.language, "ja-JP");
        assert!(config.tmdb.include_adult);
        assert_eq!(config.trending.limit, 10);
        assert_eq!(config.metrics.backend, MetricsBackendKind::Disabled);
        assert_eq!(config.appwrite.project_id, "proj");
        assert_eq!(config.appwrite.collection_id, "metrics");
    }

    #[test]
    fn test_load_unknown_backend_fails() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[metrics]\nbackend = \"redis\"\n").unwrap();

        // Act
        let result = AppConfig::load(&path);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        // Arrange
        let config = AppConfig {
            metrics: MetricsConfig {
                backend: MetricsBackendKind::Local,
            },
            ..AppConfig::default()
        };

        // Act
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        // Assert
        assert_eq!(parsed, config);
    }
}
