//! Search controller: debounced movie fetches and the trending load.
//!
//! The controller never touches [`BrowserState`] from a spawned task. Fetches
//! report back through [`ControllerEvent`]s that the event loop hands to
//! [`SearchController::handle`] one at a time.

use std::sync::Arc;
use std::time::Duration;

use moviefind_api::appwrite::MetricsApi;
use moviefind_api::tmdb::{DiscoverMovieParams, SearchMovieParams, TmdbApi};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::debounce::Debouncer;
use crate::state::{Action, BrowserState, RequestId};

/// Default quiet period before a search fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

/// Default number of trending entries.
pub const DEFAULT_TRENDING_LIMIT: u32 = 5;

/// Tunables for the search controller.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Quiet period before a search term is fetched.
    pub debounce: Duration,
    /// Number of trending entries to load.
    pub trending_limit: u32,
    /// TMDB response language.
    pub language: String,
    /// Include adult content in TMDB results.
    pub include_adult: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            trending_limit: DEFAULT_TRENDING_LIMIT,
            language: String::from("en-US"),
            include_adult: false,
        }
    }
}

/// Message delivered to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// The quiet period for this term elapsed.
    SearchDue(String),
    /// A state transition produced by a background task.
    Apply(Action),
}

/// Orchestrates the debounced fetch and the trending load.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub struct SearchController<T, M> {
    tmdb: Arc<T>,
    metrics: Arc<M>,
    settings: SearchSettings,
    events: UnboundedSender<ControllerEvent>,
    debouncer: Debouncer<ControllerEvent>,
    next_request: RequestId,
}

impl<T, M> SearchController<T, M>
where
    T: TmdbApi + Send + Sync + 'static,
    M: MetricsApi + Send + Sync + 'static,
{
    /// Creates a controller and the receiver the event loop must drain.
    #[must_use]
    pub fn new(
        tmdb: Arc<T>,
        metrics: Arc<M>,
        settings: SearchSettings,
    ) -> (Self, UnboundedReceiver<ControllerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(events.clone());
        let controller = Self {
            tmdb,
            metrics,
            settings,
            events,
            debouncer,
            next_request: 0,
        };
        (controller, rx)
    }

    /// Start-up: schedules the current term and loads the trending list once.
    pub fn mount(&mut self, state: &BrowserState) {
        self.schedule_search(state.search_term().to_owned());
        self.spawn_trending();
    }

    /// Records a new search term and restarts the quiet period.
    pub fn set_search_term(&mut self, state: &mut BrowserState, term: String) {
        if term == state.search_term() {
            return;
        }
        state.apply(Action::SetSearchTerm(term.clone()));
        self.schedule_search(term);
    }

    /// Handles one event from the channel.
    pub fn handle(&mut self, state: &mut BrowserState, event: ControllerEvent) {
        match event {
            ControllerEvent::SearchDue(term) => self.spawn_fetch(term),
            ControllerEvent::Apply(action) => state.apply(action),
        }
    }

    fn schedule_search(&mut self, term: String) {
        self.debouncer
            .schedule(ControllerEvent::SearchDue(term), self.settings.debounce);
    }

    fn spawn_fetch(&mut self, query: String) {
        self.next_request = self.next_request.wrapping_add(1);
        let request = self.next_request;
        let tmdb = Arc::clone(&self.tmdb);
        let metrics = Arc::clone(&self.metrics);
        let settings = self.settings.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            fetch_movies(tmdb.as_ref(), metrics, &settings, request, query, &events).await;
        });
    }

    fn spawn_trending(&self) {
        let metrics = Arc::clone(&self.metrics);
        let limit = self.settings.trending_limit;
        let events = self.events.clone();

        tokio::spawn(async move {
            load_trending(metrics.as_ref(), limit, &events).await;
        });
    }
}

fn emit(events: &UnboundedSender<ControllerEvent>, action: Action) {
    if events.send(ControllerEvent::Apply(action)).is_err() {
        tracing::debug!("event loop gone, dropping action");
    }
}

/// Fetches movies for `query` and reports the outcome as actions.
///
/// An empty query lists popular movies instead of searching. When a
/// non-empty query returns results, the top result is recorded with
/// `metrics` on a detached task; a failure there is only logged.
pub async fn fetch_movies<T, M>(
    tmdb: &T,
    metrics: Arc<M>,
    settings: &SearchSettings,
    request: RequestId,
    query: String,
    events: &UnboundedSender<ControllerEvent>,
) where
    T: TmdbApi + Sync,
    M: MetricsApi + Send + Sync + 'static,
{
    emit(events, Action::FetchStarted { request });

    let result = if query.is_empty() {
        let params = DiscoverMovieParams::default()
            .language(settings.language.as_str())
            .include_adult(settings.include_adult);
        tmdb.discover_movie(&params).await
    } else {
        let params = SearchMovieParams::new(query.as_str())
            .language(settings.language.as_str())
            .include_adult(settings.include_adult);
        tmdb.search_movie(&params).await
    };

    match result {
        Ok(response) => {
            let movies = response.results;
            tracing::debug!(request, query = %query, count = movies.len(), "movies fetched");

            if !query.is_empty()
                && let Some(top) = movies.first().cloned()
            {
                tokio::spawn(async move {
                    if let Err(e) = metrics.update_search_count(&query, &top).await {
                        tracing::warn!("Failed to record search for {query:?}: {e:#}");
                    }
                });
            }

            emit(events, Action::FetchSucceeded { request, movies });
        }
        Err(e) => {
            tracing::error!("Error fetching movies: {e:#}");
            emit(events, Action::FetchFailed { request });
        }
    }
}

/// Loads the trending list. A failure is logged and leaves the state as is.
pub async fn load_trending<M: MetricsApi + Sync>(
    metrics: &M,
    limit: u32,
    events: &UnboundedSender<ControllerEvent>,
) {
    match metrics.trending_movies(limit).await {
        Ok(trending) => {
            tracing::debug!(count = trending.len(), "trending movies loaded");
            emit(events, Action::TrendingLoaded(trending));
        }
        Err(e) => tracing::error!("Error fetching trending movies: {e:#}"),
    }
}
