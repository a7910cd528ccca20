// Components module - one file per screen region
//
// Left column: title bar, transcript, command input.
// Right column: agent trace, execution kernel log.
// Bottom: status bar with key hints and the latest log line.
//
// Each component exposes `render(f, area, app)`; the text each one shows is
// built by plain functions so it can be tested without a terminal.

pub mod input_bar;
pub mod kernel_log;
pub mod status_bar;
pub mod title_bar;
pub mod trace_panel;
pub mod transcript_panel;

use ratatui::text::Line;

/// Rows `lines` occupy once wrapped to `width` columns
///
/// Character-wrapped estimate; word wrapping can add a row on long lines,
/// which only affects how far auto-follow scrolls.
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum()
}
