// Command input line

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let busy = app.is_busy();

    let (title, border) = if busy {
        (" Command (waiting for orchestrator) ", theme.muted_style())
    } else {
        (" Command ", Style::default().fg(theme.user))
    };

    let mut spans = vec![
        Span::styled("> ", Style::default().fg(theme.user)),
        Span::styled(app.input.clone(), Style::default().fg(theme.text)),
    ];
    if !busy && app.cursor_visible() {
        spans.push(Span::styled("█", Style::default().fg(theme.user)));
    }

    // Keep the end of long input in view
    let inner_width = area.width.saturating_sub(2);
    let typed = app.input.chars().count() as u16 + 3;
    let hscroll = typed.saturating_sub(inner_width);

    let input = Paragraph::new(Line::from(spans))
        .scroll((0, hscroll))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(border),
        );
    f.render_widget(input, area);
}
