//! Terminal UI for moviefind.
//!
//! Uses `ratatui` + `crossterm` for rendering. The search controller owns
//! the debounced fetch cycle; the state store is mutated only through
//! typed actions applied by the event loop.

mod app;
/// Movie card presentation.
pub mod card;
/// Search controller: debounced fetches and trending load.
pub mod controller;
/// Cancellable scheduled delivery of values.
pub mod debounce;
mod spinner;
/// Browser state store.
pub mod state;
mod ui;

pub use app::run_browser;
pub use controller::{ControllerEvent, SearchController, SearchSettings};
pub use debounce::{DebounceHandle, Debouncer};
pub use state::{Action, BrowserState, InputMode, MovieListView};
