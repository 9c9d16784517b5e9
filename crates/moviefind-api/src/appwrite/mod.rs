//! Appwrite document store client module.
//!
//! Reads and writes per-search-term popularity counters through the
//! Appwrite Databases REST API.

mod api;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalMetricsApi, MetricsApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{AppwriteClient, AppwriteClientBuilder};
pub use types::{NewSearchMetric, Query, TrendingMovie};
