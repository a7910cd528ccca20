// Console palette
//
// Dark zinc surfaces with one accent per concern: blue for the operator,
// emerald for the execution kernel, and a distinct hue per trace step.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Color,
    pub border: Color,
    pub border_type: BorderType,
    pub muted: Color,
    pub text: Color,
    pub user: Color,
    pub agent: Color,
    pub error: Color,
    pub busy: Color,
    pub kernel: Color,
    /// One color per trace step, in step order
    pub steps: [Color; 4],
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Color::Rgb(244, 244, 245),
            border: Color::Rgb(39, 39, 42),
            border_type: BorderType::Rounded,
            muted: Color::Rgb(113, 113, 122),
            text: Color::Rgb(228, 228, 231),
            user: Color::Rgb(59, 130, 246),
            agent: Color::Rgb(52, 211, 153),
            error: Color::Rgb(248, 113, 113),
            busy: Color::Rgb(251, 191, 36),
            kernel: Color::Rgb(16, 185, 129),
            steps: [
                Color::Rgb(192, 132, 252),
                Color::Rgb(34, 211, 238),
                Color::Rgb(52, 211, 153),
                Color::Rgb(251, 191, 36),
            ],
        }
    }
}

impl Theme {
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }
}
