//! Loading spinner.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Braille animation frames.
const FRAMES: [&str; 10] = [
    "\u{280b}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283c}", "\u{2834}", "\u{2826}", "\u{2827}",
    "\u{2807}", "\u{280f}",
];

/// Returns the frame for `tick`.
pub fn frame(tick: u64) -> &'static str {
    let len = u64::try_from(FRAMES.len()).unwrap_or(1);
    tick.checked_rem(len)
        .and_then(|idx| usize::try_from(idx).ok())
        .and_then(|idx| FRAMES.get(idx))
        .copied()
        .unwrap_or(" ")
}

/// Spinner line shown while movies load.
pub fn loading_line(tick: u64) -> Line<'static> {
    Line::from(vec![
        Span::styled(frame(tick), Style::default().fg(Color::Cyan)),
        Span::raw(" Loading movies..."),
    ])
}
