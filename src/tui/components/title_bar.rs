// Title bar component

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const TITLE: &str = "Smart Audit / Orchestrator Prototype";

/// Render the title with a busy indicator and the session identity
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let config = app.session.config();

    let mut spans = vec![Span::styled(format!(" {}", TITLE), theme.title_style())];
    if app.is_busy() {
        spans.push(Span::styled(
            format!("  {} streaming", app.spinner_char()),
            Style::default().fg(theme.busy),
        ));
    }

    let identity = Line::from(Span::styled(
        format!(" {} · {} ", config.user_id, config.session_id),
        theme.muted_style(),
    ))
    .right_aligned();

    let title = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.border_style())
            .title_top(identity),
    );
    f.render_widget(title, area);
}
