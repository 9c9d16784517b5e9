//! Movie browser main loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use moviefind_api::appwrite::MetricsApi;
use moviefind_api::tmdb::TmdbApi;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::controller::{SearchController, SearchSettings};
use crate::state::{BrowserState, InputMode};
use crate::ui;

/// Spinner animation interval.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// How long the input reader waits before checking for shutdown.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the movie browser TUI until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup, input, or drawing fails.
pub async fn run_browser<T, M>(tmdb: Arc<T>, metrics: Arc<M>, settings: SearchSettings) -> Result<()>
where
    T: TmdbApi + Send + Sync + 'static,
    M: MetricsApi + Send + Sync + 'static,
{
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, tmdb, metrics, settings).await;

    // Cleanup (always attempt even if event loop failed)
    finish_session(result, restore_terminal())
}

/// Leaves raw mode and the alternate screen. Both steps run; the first error wins.
fn restore_terminal() -> Result<()> {
    let raw_mode = disable_raw_mode().context("failed to disable raw mode");
    let screen = crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen");
    raw_mode.and(screen)
}

/// Merges the event loop outcome with the cleanup outcome.
///
/// An event loop error takes precedence; a cleanup error behind it is logged.
fn finish_session(result: Result<()>, cleanup: Result<()>) -> Result<()> {
    match (result, cleanup) {
        (Err(e), Err(cleanup_err)) => {
            tracing::warn!("Terminal cleanup failed: {cleanup_err:#}");
            Err(e)
        }
        (result, cleanup) => result.and(cleanup),
    }
}

/// Main event loop.
async fn run_event_loop<T, M>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    tmdb: Arc<T>,
    metrics: Arc<M>,
    settings: SearchSettings,
) -> Result<()>
where
    T: TmdbApi + Send + Sync + 'static,
    M: MetricsApi + Send + Sync + 'static,
{
    let mut state = BrowserState::new();
    let (mut controller, mut events) = SearchController::new(tmdb, metrics, settings);
    controller.mount(&state);

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || read_input(&input_tx));

    let mut ticker = tokio::time::interval(TICK_INTERVAL);

    loop {
        terminal
            .draw(|frame| ui::draw(frame, &mut state))
            .context("failed to draw TUI")?;

        tokio::select! {
            input = input_rx.recv() => {
                let Some(input) = input else {
                    return Ok(());
                };
                if let Event::Key(key) = input?
                    && key.kind == KeyEventKind::Press
                    && handle_key(&mut controller, &mut state, key)
                {
                    return Ok(());
                }
            }
            Some(event) = events.recv() => controller.handle(&mut state, event),
            _ = ticker.tick() => {
                if state.is_loading() {
                    state.advance_tick();
                }
            }
        }
    }
}

/// Forwards terminal input until the event loop drops the receiver.
fn read_input(tx: &UnboundedSender<Result<Event>>) {
    while !tx.is_closed() {
        match event::poll(INPUT_POLL_INTERVAL) {
            Ok(false) => {}
            Ok(true) => {
                let read = event::read().context("failed to read event");
                let failed = read.is_err();
                if tx.send(read).is_err() || failed {
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(Err::<Event, _>(e).context("failed to poll events"));
                return;
            }
        }
    }
}

/// Dispatches a key press by input mode. Returns `true` to exit.
fn handle_key<T, M>(
    controller: &mut SearchController<T, M>,
    state: &mut BrowserState,
    key: KeyEvent,
) -> bool
where
    T: TmdbApi + Send + Sync + 'static,
    M: MetricsApi + Send + Sync + 'static,
{
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    match state.input_mode {
        InputMode::Search => {
            handle_search_input(controller, state, key);
            false
        }
        InputMode::Normal => handle_normal_input(state, key.code),
    }
}

/// Handles key input in search mode.
fn handle_search_input<T, M>(
    controller: &mut SearchController<T, M>,
    state: &mut BrowserState,
    key: KeyEvent,
) where
    T: TmdbApi + Send + Sync + 'static,
    M: MetricsApi + Send + Sync + 'static,
{
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Down => {
            state.input_mode = InputMode::Normal;
        }
        _ => {
            if let Some(term) = edited_search_term(state.search_term(), key) {
                controller.set_search_term(state, term);
            }
        }
    }
}

/// Returns the search term after an editing key, or `None` if `key` does not edit.
///
/// Control and Alt chords other than Ctrl-U are ignored rather than typed.
fn edited_search_term(term: &str, key: KeyEvent) -> Option<String> {
    let chord = key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(String::new())
        }
        KeyCode::Backspace => {
            let mut term = term.to_owned();
            term.pop();
            Some(term)
        }
        KeyCode::Char(c) if !chord => {
            let mut term = term.to_owned();
            term.push(c);
            Some(term)
        }
        _ => None,
    }
}

/// Handles key input in normal mode. Returns `true` to exit.
fn handle_normal_input(state: &mut BrowserState, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Up | KeyCode::Char('k') => state.move_up(),
        KeyCode::Down | KeyCode::Char('j') => state.move_down(),
        KeyCode::Char('/') => state.input_mode = InputMode::Search,
        KeyCode::Char('o') => open_movie_page(state),
        _ => {}
    }
    false
}

/// Opens the TMDB page of the selected movie.
fn open_movie_page(state: &BrowserState) {
    let Some(movie) = state.selected_movie() else {
        return;
    };
    let url = movie.page_url();
    if let Err(e) = open::that(&url) {
        tracing::warn!("Failed to open {url}: {e}");
    }
}
