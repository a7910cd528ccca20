// Execution kernel log
//
// Shows the typewriter's visible text with a block cursor at the tail. The
// panel follows the tail unless the user has scrolled it back.

use super::wrapped_height;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub const IDLE_TEXT: &str = "> System idle. Awaiting command...";
const CURSOR: &str = "█";

/// Lines of the log, cursor appended to the last one
pub fn kernel_lines(visible: &str, cursor: bool, style: Style) -> Vec<Line<'static>> {
    let text = if visible.is_empty() { IDLE_TEXT } else { visible };

    let mut lines: Vec<Line<'static>> = text
        .split('\n')
        .map(|l| Line::from(Span::styled(l.to_string(), style)))
        .collect();

    if cursor {
        if let Some(last) = lines.last_mut() {
            last.push_span(Span::styled(CURSOR, style));
        }
    }
    lines
}

pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    let visible = app.session.typewriter().visible();
    let style = if visible.is_empty() {
        theme.muted_style()
    } else {
        Style::default().fg(theme.kernel)
    };
    let lines = kernel_lines(&visible, app.cursor_visible(), style);

    let block = Block::default()
        .title(" Execution Kernel ")
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.border_style());

    let inner = block.inner(area);
    app.kernel_scroll
        .update_dimensions(wrapped_height(&lines, inner.width), inner.height as usize);
    let offset = u16::try_from(app.kernel_scroll.offset()).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    f.render_widget(paragraph, area);
}
