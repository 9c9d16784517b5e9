//! Local database for search popularity metrics.
//!
//! Uses `rusqlite` (bundled `SQLite`) as an offline alternative to the
//! Appwrite document store.

mod connection;
/// Search metrics CRUD operations.
pub mod metrics;
mod migrations;
mod store;

pub use connection::{open_db, resolve_data_dir, xdg_base_dir};
#[allow(clippy::module_name_repetitions)]
pub use metrics::{MetricRow, load_trending, record_search};
pub use store::LocalMetricsStore;
