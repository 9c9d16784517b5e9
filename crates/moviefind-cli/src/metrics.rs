//! Popularity backend chosen at start-up.

use std::path::Path;

use anyhow::{Context, Result};
use moviefind_api::appwrite::{AppwriteClient, MetricsApi, TrendingMovie};
use moviefind_api::tmdb::TmdbMovie;
use moviefind_db::LocalMetricsStore;
use tracing::instrument;
use url::Url;

use crate::config::{AppConfig, AppwriteConfig, MetricsBackendKind};
use crate::USER_AGENT;

/// Search popularity backend selected by `[metrics] backend`.
#[derive(Debug)]
pub enum MetricsBackend {
    /// Hosted Appwrite collection.
    Appwrite(AppwriteClient),
    /// Local `SQLite` store.
    Local(LocalMetricsStore),
    /// Records nothing and reports an empty trending list.
    Disabled,
}

impl MetricsBackend {
    /// Builds the backend named in `config`.
    ///
    /// `api_key` is the value of `APPWRITE_API_KEY`, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the Appwrite settings are incomplete or the local
    /// database cannot be opened.
    #[instrument(skip_all)]
    pub fn from_config(config: &AppConfig, dir: Option<&Path>, api_key: Option<String>) -> Result<Self> {
        match config.metrics.backend {
            MetricsBackendKind::Appwrite => {
                build_appwrite_client(&config.appwrite, api_key).map(Self::Appwrite)
            }
            MetricsBackendKind::Local => LocalMetricsStore::open(dir)
                .context("failed to open local metrics store")
                .map(Self::Local),
            MetricsBackendKind::Disabled => Ok(Self::Disabled),
        }
    }

    /// Backend name for log output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Appwrite(_) => "appwrite",
            Self::Local(_) => "local",
            Self::Disabled => "disabled",
        }
    }
}

/// Builds an `AppwriteClient` from the `[appwrite]` section.
fn build_appwrite_client(config: &AppwriteConfig, api_key: Option<String>) -> Result<AppwriteClient> {
    let endpoint = Url::parse(&config.endpoint)
        .with_context(|| format!("invalid appwrite.endpoint: {}", config.endpoint))?;

    let mut builder = AppwriteClient::builder()
        .endpoint(endpoint)
        .project_id(config.project_id.as_str())
        .database_id(config.database_id.as_str())
        .collection_id(config.collection_id.as_str())
        .user_agent(USER_AGENT);
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    builder
        .build()
        .context("incomplete [appwrite] configuration (set metrics.backend = \"local\" to run without it)")
}

impl MetricsApi for MetricsBackend {
    async fn trending_movies(&self, limit: u32) -> Result<Vec<TrendingMovie>> {
        match self {
            Self::Appwrite(client) => client.trending_movies(limit).await,
            Self::Local(store) => store.trending_movies(limit).await,
            Self::Disabled => Ok(Vec::new()),
        }
    }

    async fn update_search_count(&self, search_term: &str, top_result: &TmdbMovie) -> Result<()> {
        match self {
            Self::Appwrite(client) => client.update_search_count(search_term, top_result).await,
            Self::Local(store) => store.update_search_count(search_term, top_result).await,
            Self::Disabled => Ok(()),
        }
    }
}
