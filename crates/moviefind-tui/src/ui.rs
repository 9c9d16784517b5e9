//! TUI rendering logic for the movie browser.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};

use crate::card::MovieCard;
use crate::spinner;
use crate::state::{BrowserState, InputMode, MovieListView};

/// Draws the browser UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &mut BrowserState) {
    let trending_height = if state.trending().is_empty() { 0 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),               // header
            Constraint::Length(trending_height), // trending strip
            Constraint::Min(5),                  // movie list
            Constraint::Length(3),               // footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], state);
    if !state.trending().is_empty() {
        draw_trending(frame, chunks[1], state);
    }
    draw_movie_list(frame, chunks[2], state);
    draw_footer(frame, chunks[3], state);
}

/// Draws the search box and the app banner.
#[allow(clippy::indexing_slicing)]
fn draw_header(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let search_style = if state.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let search = Paragraph::new(state.search_term().to_owned())
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search through thousands of movies: / "),
        );
    frame.render_widget(search, header_chunks[0]);

    let banner = Paragraph::new(Line::from(vec![
        Span::raw("Find "),
        Span::styled(
            "Movies",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" You'll Enjoy"),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" moviefind "));
    frame.render_widget(banner, header_chunks[1]);
}

/// Draws the ranked trending strip.
fn draw_trending(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let mut spans = Vec::new();
    for (rank, movie) in (1_usize..).zip(state.trending()) {
        spans.push(Span::styled(
            format!("{rank}. "),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!("{}   ", movie.title)));
    }

    let strip = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Trending Movies "));
    frame.render_widget(strip, area);
}

/// Draws the movie list in its current render branch.
fn draw_movie_list(frame: &mut Frame, area: Rect, state: &mut BrowserState) {
    let block = Block::default().borders(Borders::ALL).title(" All Movies ");

    match state.movie_view() {
        MovieListView::Loading => {
            let loading = Paragraph::new(spinner::loading_line(state.tick())).block(block);
            frame.render_widget(loading, area);
        }
        MovieListView::Empty => {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No movies found",
                Style::default().fg(Color::Red),
            )))
            .block(block);
            frame.render_widget(empty, area);
        }
        MovieListView::Populated => {
            let header = Row::new(vec!["Title", "Rating", "Lang", "Year", "Poster"])
                .style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
                .bottom_margin(1);

            let rows: Vec<Row> = state
                .movies()
                .iter()
                .map(|movie| {
                    let card = MovieCard::from_movie(movie);
                    Row::new(vec![
                        card.title,
                        format!("\u{2605} {}", card.rating),
                        card.language,
                        card.year,
                        card.poster,
                    ])
                })
                .collect();

            let widths = [
                Constraint::Min(24),    // Title
                Constraint::Length(7),  // Rating
                Constraint::Length(5),  // Lang
                Constraint::Length(5),  // Year
                Constraint::Length(64), // Poster
            ];

            let highlight = if state.input_mode == InputMode::Normal {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let table = Table::new(rows, widths)
                .header(header)
                .block(block)
                .row_highlight_style(highlight);

            frame.render_stateful_widget(table, area, &mut state.table_state);
        }
    }
}

/// Draws the footer with key hints.
fn draw_footer(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let help_text = match state.input_mode {
        InputMode::Search => {
            Line::from("Type to search | Ctrl-U: clear | Enter/Esc/\u{2193}: browse | Ctrl-C: quit")
        }
        InputMode::Normal => Line::from(vec![Span::raw(
            "\u{2191}\u{2193}/j/k: move  o: open on TMDB  /: search  q: quit",
        )]),
    };

    let footer = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use moviefind_api::appwrite::TrendingMovie;
    use moviefind_api::tmdb::TmdbMovie;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::state::Action;

    fn render(state: &mut BrowserState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|frame| draw(frame, state)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_empty_state_shows_no_movies_found() {
        // Arrange
        let mut state = BrowserState::new();

        // Act
        let screen = render(&mut state);

        // Assert
        assert!(screen.contains("No movies found"));
        assert!(!screen.contains("Trending Movies"));
    }

    #[test]
    fn test_loading_state_shows_spinner() {
        // Arrange
        let mut state = BrowserState::new();
        state.apply(Action::FetchStarted { request: 1 });

        // Act
        let screen = render(&mut state);

        // Assert
        assert!(screen.contains("Loading movies..."));
    }

    #[test]
    fn test_populated_state_shows_cards_and_trending() {
        // Arrange
        let mut state = BrowserState::new();
        state.apply(Action::FetchSucceeded {
            request: 1,
            movies: vec![TmdbMovie {
                id: 1,
                title: String::from("Dune"),
                poster_path: None,
                vote_average: 7.8,
                original_language: String::from("en"),
                release_date: Some(String::from("2021-09-15")),
                overview: None,
            }],
        });
        state.apply(Action::TrendingLoaded(vec![TrendingMovie {
            id: String::from("doc1"),
            search_term: String::from("dune"),
            count: 12,
            movie_id: 1,
            poster_url: String::new(),
            title: String::from("Dune"),
        }]));

        // Act
        let screen = render(&mut state);

        // Assert
        assert!(screen.contains("Trending Movies"));
        assert!(screen.contains("1. Dune"));
        assert!(screen.contains("7.8"));
        assert!(screen.contains("2021"));
        assert!(screen.contains(crate::card::NO_POSTER));
    }
}
