// Agent trace panel
//
// Four fixed steps fed by the merged trace record of the current exchange.
// A step shows its value once the orchestrator has reported it, a pending
// label while the exchange is in flight, and a fallback once it is over.

use crate::parser::models::TraceRecord;
use crate::tui::app::App;
use crate::util::{single_line, truncate_to_width};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde_json::Value;

/// How a step's value came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Resolved,
    Pending,
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub number: &'static str,
    pub title: &'static str,
    pub value: String,
    pub state: StepState,
}

fn step(
    number: &'static str,
    title: &'static str,
    value: Option<String>,
    busy: bool,
    pending: &str,
    missing: &str,
) -> TraceStep {
    let (value, state) = match value {
        Some(v) => (v, StepState::Resolved),
        None if busy => (pending.to_string(), StepState::Pending),
        None => (missing.to_string(), StepState::Missing),
    };
    TraceStep {
        number,
        title,
        value,
        state,
    }
}

/// Confidence as a percentage with one decimal
pub fn format_confidence(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Strings verbatim, anything else as compact JSON
pub fn format_actual_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The four steps, or `None` when the panel should read "System Idle"
pub fn trace_steps(trace: &TraceRecord, busy: bool) -> Option<[TraceStep; 4]> {
    if trace.is_empty() && !busy {
        return None;
    }

    Some([
        step(
            "01",
            "Memory Hit",
            trace.memory_context.clone(),
            busy,
            "Searching World Model...",
            "N/A",
        ),
        step(
            "02",
            "Domain Classification",
            trace.domain.clone(),
            busy,
            "Classifying Intent...",
            "N/A",
        ),
        step(
            "03",
            "Confidence",
            // 0.0 is the backend's placeholder before matching has run
            trace.score.filter(|s| *s > 0.0).map(format_confidence),
            busy,
            "Calculating...",
            "0%",
        ),
        step(
            "04",
            "Actual Value",
            trace.actual_value.as_ref().map(format_actual_value),
            busy,
            "Auditing...",
            "N/A",
        ),
    ])
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let (trace, busy) = {
        let state = app.session.state().lock();
        (state.trace().clone(), state.is_busy())
    };

    let block = Block::default()
        .title(" Agent Trace ")
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.border_style());

    let Some(steps) = trace_steps(&trace, busy) else {
        let idle = Paragraph::new(Line::from(Span::styled(
            "System Idle",
            theme.muted_style().add_modifier(Modifier::ITALIC),
        )))
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(idle, area);
        return;
    };

    // Two columns of border, two of indent
    let value_width = area.width.saturating_sub(4) as usize;

    let mut lines = Vec::with_capacity(steps.len() * 2);
    for (step, color) in steps.iter().zip(theme.steps) {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", step.number), Style::default().fg(color)),
            Span::styled(step.title, Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
        ]));

        let value_style = match step.state {
            StepState::Resolved => Style::default().fg(color),
            StepState::Pending => theme.muted_style().add_modifier(Modifier::ITALIC),
            StepState::Missing => theme.muted_style(),
        };
        lines.push(Line::from(Span::styled(
            format!("  {}", truncate_to_width(&single_line(&step.value), value_width)),
            value_style,
        )));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}
