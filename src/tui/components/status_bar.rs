// Status bar - key hints on the left, newest log line on the right

use crate::logging::LogLevel;
use crate::tui::app::App;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const HINTS: &str = " Enter send · PgUp/PgDn scroll · Esc quit ";

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(HINTS.chars().count() as u16), Constraint::Min(0)])
        .split(area);

    f.render_widget(
        Paragraph::new(Span::styled(HINTS, theme.muted_style())),
        chunks[0],
    );

    if let Some(entry) = app.log_buffer.latest_at_least(LogLevel::Info) {
        let style = match entry.level {
            LogLevel::Error => Style::default().fg(theme.error),
            LogLevel::Warn => Style::default().fg(theme.busy),
            _ => theme.muted_style(),
        };
        let text = truncate_to_width(&entry.display_line(), chunks[1].width.saturating_sub(1) as usize);
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(text, style)).right_aligned()),
            chunks[1],
        );
    }
}
