// UI rendering logic
//
// Screen layout:
//
//   ┌ title ────────────────────┐┌ Agent Trace ─────┐
//   ├ Transcript ───────────────┤│ 01 .. 04         │
//   │                           │├ Execution Kernel ┤
//   ├ Command ──────────────────┤│                  │
//   └───────────────────────────┘└──────────────────┘
//    status bar
//
// Narrow terminals stack the right column under the left one.

use super::app::App;
use super::components::{input_bar, kernel_log, status_bar, title_bar, trace_panel, transcript_panel};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

/// Rows of the trace panel: four steps of two lines plus borders
const TRACE_HEIGHT: u16 = 10;

/// Width share of the right column, or `None` to stack the columns
fn right_column_pct(width: u16) -> Option<u16> {
    match width {
        0..=79 => None,
        80..=139 => Some(45),
        _ => Some(38),
    }
}

/// Main UI render function - called on every drawn frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(f.area());

    let (left, right) = match right_column_pct(rows[0].width) {
        Some(pct) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(100 - pct), Constraint::Percentage(pct)])
                .split(rows[0]);
            (columns[0], columns[1])
        }
        None => {
            let stacked = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(rows[0]);
            (stacked[0], stacked[1])
        }
    };

    render_left(f, left, app);
    render_right(f, right, app);
    status_bar::render(f, rows[1], app);
}

fn render_left(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(3),    // Transcript
            Constraint::Length(3), // Command input
        ])
        .split(area);

    title_bar::render(f, chunks[0], app);
    transcript_panel::render(f, chunks[1], app);
    input_bar::render(f, chunks[2], app);
}

fn render_right(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(TRACE_HEIGHT), Constraint::Min(3)])
        .split(area);

    trace_panel::render(f, chunks[0], app);
    kernel_log::render(f, chunks[1], app);
}
