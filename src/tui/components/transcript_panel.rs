// Transcript panel
//
// Finalized messages in arrival order, each prefixed with its role. While an
// exchange is in flight a spinner line trails the transcript.

use super::wrapped_height;
use crate::state::{Message, Role};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub const BUSY_TEXT: &str = "Orchestrator invoking agents...";

fn role_style(role: Role, theme: &Theme) -> Style {
    let color = match role {
        Role::User => theme.user,
        Role::Agent => theme.agent,
        Role::Error => theme.error,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Render-ready lines for `messages`, with a blank line between entries
pub fn transcript_lines(
    messages: &[Message],
    busy: Option<char>,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        let label = Span::styled(format!("{} › ", message.role.label()), role_style(message.role, theme));
        let body_style = match message.role {
            Role::Error => Style::default().fg(theme.error),
            _ => Style::default().fg(theme.text),
        };

        let mut body = message.content.split('\n');
        let first = body.next().unwrap_or_default();
        lines.push(Line::from(vec![
            label,
            Span::styled(first.to_string(), body_style),
        ]));
        // Continuation lines are indented under the label
        for rest in body {
            lines.push(Line::from(Span::styled(format!("  {}", rest), body_style)));
        }
    }

    if let Some(spinner) = busy {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            format!("{} {}", spinner, BUSY_TEXT),
            Style::default().fg(theme.busy).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let (messages, busy) = {
        let state = app.session.state().lock();
        (state.transcript().to_vec(), state.is_busy())
    };
    let spinner = busy.then(|| app.spinner_char());
    let lines = transcript_lines(&messages, spinner, &app.theme);

    let block = Block::default()
        .title(" Transcript ")
        .title_style(app.theme.title_style())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.border_style());

    let inner = block.inner(area);
    app.transcript_scroll
        .update_dimensions(wrapped_height(&lines, inner.width), inner.height as usize);
    let offset = u16::try_from(app.transcript_scroll.offset()).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_roles_are_labelled() {
        let messages = vec![
            Message::new(Role::User, "status?"),
            Message::new(Role::Agent, "42"),
            Message::new(Role::Error, "Kernel link failed."),
        ];
        let lines = transcript_lines(&messages, None, &Theme::default());
        assert_eq!(
            text(&lines),
            vec!["you › status?", "", "agent › 42", "", "error › Kernel link failed."]
        );
    }

    #[test]
    fn test_multiline_content_is_indented() {
        let messages = vec![Message::new(Role::Agent, "line one\nline two")];
        let lines = transcript_lines(&messages, None, &Theme::default());
        assert_eq!(text(&lines), vec!["agent › line one", "  line two"]);
    }

    #[test]
    fn test_busy_line_trails_transcript() {
        let messages = vec![Message::new(Role::User, "status?")];
        let lines = transcript_lines(&messages, Some('⣾'), &Theme::default());
        assert_eq!(
            text(&lines).last().map(String::as_str),
            Some("⣾ Orchestrator invoking agents...")
        );
    }
}
