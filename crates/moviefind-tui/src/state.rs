//! Browser state store and its typed transitions.

use moviefind_api::appwrite::TrendingMovie;
use moviefind_api::tmdb::TmdbMovie;
use ratatui::widgets::TableState;

/// Identifier of one fetch invocation, increasing per fetch.
pub type RequestId = u64;

/// Input mode for the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Typing edits the search term.
    #[default]
    Search,
    /// Navigation mode.
    Normal,
}

/// Which branch the movie list renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieListView {
    /// A fetch is in flight.
    Loading,
    /// The last fetch returned nothing or failed.
    Empty,
    /// Movies are available.
    Populated,
}

/// State transitions applied by the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The search term changed.
    SetSearchTerm(String),
    /// A movie fetch started.
    FetchStarted {
        /// Fetch identifier.
        request: RequestId,
    },
    /// A movie fetch returned results.
    FetchSucceeded {
        /// Fetch identifier.
        request: RequestId,
        /// Results in provider order.
        movies: Vec<TmdbMovie>,
    },
    /// A movie fetch failed.
    FetchFailed {
        /// Fetch identifier.
        request: RequestId,
    },
    /// The trending list was loaded.
    TrendingLoaded(Vec<TrendingMovie>),
}

/// State for the movie browser.
#[derive(Debug, Default)]
pub struct BrowserState {
    search_term: String,
    movies: Vec<TmdbMovie>,
    trending: Vec<TrendingMovie>,
    is_loading: bool,
    /// Most recently started fetch.
    latest_request: Option<RequestId>,
    /// Table state for the movie list (handles selection and scroll).
    pub table_state: TableState,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Spinner animation counter.
    tick: u64,
}

impl BrowserState {
    /// Creates an empty state in search input mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current search term.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Current movie list.
    #[must_use]
    pub fn movies(&self) -> &[TmdbMovie] {
        &self.movies
    }

    /// Current trending list.
    #[must_use]
    pub fn trending(&self) -> &[TrendingMovie] {
        &self.trending
    }

    /// Whether a movie fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Spinner animation counter.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Selects the render branch for the movie list.
    #[must_use]
    pub fn movie_view(&self) -> MovieListView {
        if self.is_loading {
            MovieListView::Loading
        } else if self.movies.is_empty() {
            MovieListView::Empty
        } else {
            MovieListView::Populated
        }
    }

    /// Applies one transition.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SetSearchTerm(term) => self.search_term = term,
            Action::FetchStarted { request } => {
                self.latest_request = Some(request);
                self.is_loading = true;
            }
            Action::FetchSucceeded { request, movies } => {
                self.note_superseded(request);
                self.movies = movies;
                self.is_loading = false;
                self.reset_cursor();
            }
            Action::FetchFailed { request } => {
                self.note_superseded(request);
                self.movies.clear();
                self.is_loading = false;
                self.reset_cursor();
            }
            Action::TrendingLoaded(trending) => self.trending = trending,
        }
    }

    /// Responses land in arrival order, even when a newer fetch started.
    fn note_superseded(&self, request: RequestId) {
        if let Some(latest) = self.latest_request
            && request != latest
        {
            tracing::debug!(request, latest, "applying superseded fetch response");
        }
    }

    fn reset_cursor(&mut self) {
        let selected = if self.movies.is_empty() { None } else { Some(0) };
        self.table_state.select(selected);
    }

    /// Returns the cursor position in the movie list.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    /// Returns the movie under the cursor (if any).
    #[must_use]
    pub fn selected_movie(&self) -> Option<&TmdbMovie> {
        self.movies.get(self.cursor())
    }

    /// Moves cursor up.
    pub fn move_up(&mut self) {
        let current = self.cursor();
        if current > 0 {
            self.table_state.select(Some(current.saturating_sub(1)));
        }
    }

    /// Moves cursor down.
    pub fn move_down(&mut self) {
        let next = self.cursor().saturating_add(1);
        if next < self.movies.len() {
            self.table_state.select(Some(next));
        }
    }

    /// Advances the spinner.
    pub const fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }
}
