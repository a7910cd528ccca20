// TUI application state
//
// Holds what the console owns itself (input line, scroll positions, animation
// frame). Conversation state, trace and kernel log are read from the session
// at draw time.

use super::scroll::ScrollState;
use super::theme::Theme;
use crate::logging::LogBuffer;
use crate::session::Session;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::task::JoinHandle;

/// Spinner frames for the busy indicator
const SPINNER: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

/// Main application state for the TUI
pub struct App {
    pub session: Session,

    /// Captured tracing output, newest entry shown in the status bar
    pub log_buffer: LogBuffer,

    pub theme: Theme,

    /// Text being typed into the command line
    pub input: String,

    pub transcript_scroll: ScrollState,
    pub kernel_scroll: ScrollState,

    /// Exchange spawned for the last submission; counts as busy until it
    /// finishes, even before the session has marked itself busy
    pub exchange: Option<JoinHandle<()>>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Animation frame counter, advanced on every drawn frame
    frame: usize,
}

impl App {
    pub fn new(session: Session, log_buffer: LogBuffer) -> Self {
        Self {
            session,
            log_buffer,
            theme: Theme::default(),
            input: String::new(),
            transcript_scroll: ScrollState::new(),
            kernel_scroll: ScrollState::new(),
            exchange: None,
            should_quit: false,
            frame: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        let spawned = self.exchange.as_ref().is_some_and(|task| !task.is_finished());
        spawned || self.session.state().is_busy()
    }

    /// Handle a key press. Returns a query when Enter submits one.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<String> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Enter => return self.take_submission(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::PageUp => self.transcript_scroll.page_up(),
            KeyCode::PageDown => self.transcript_scroll.page_down(),
            KeyCode::Char(c) if !ctrl => self.input.push(c),
            _ => {}
        }
        None
    }

    /// Enter is ignored while an exchange is in flight or the line is blank;
    /// the typed text is kept in both cases.
    fn take_submission(&mut self) -> Option<String> {
        if self.is_busy() || self.input.trim().is_empty() {
            return None;
        }
        self.transcript_scroll.scroll_to_bottom();
        self.kernel_scroll.scroll_to_bottom();
        Some(std::mem::take(&mut self.input))
    }

    pub fn tick_animation(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn spinner_char(&self) -> char {
        SPINNER[(self.frame / 3) % SPINNER.len()]
    }

    /// Block cursor blinks about once a second at the default frame interval
    pub fn cursor_visible(&self) -> bool {
        cursor_phase(self.frame)
    }

    /// True on the frame where the cursor turns on or off
    pub fn cursor_toggled(&self) -> bool {
        cursor_phase(self.frame) != cursor_phase(self.frame.wrapping_sub(1))
    }
}

fn cursor_phase(frame: usize) -> bool {
    (frame / 15) % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoTransport;
    use crate::session::SessionConfig;
    use crate::state::SharedState;
    use crate::typewriter::TypewriterHandle;
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> App {
        let config = SessionConfig {
            endpoint: "demo://orchestrator".to_string(),
            user_id: "default_user".to_string(),
            session_id: "session_1".to_string(),
            idle_timeout: Duration::from_secs(5),
        };
        let session = Session::new(
            config,
            Arc::new(DemoTransport::new()),
            SharedState::new(),
            TypewriterHandle::new(),
        );
        App::new(session, LogBuffer::new())
    }

    fn press(app: &mut App, code: KeyCode) -> Option<String> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_enter_submits_and_clears_input() {
        let mut app = app();
        type_text(&mut app, "status?");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('!'));

        assert_eq!(press(&mut app, KeyCode::Enter), Some("status!".to_string()));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_blank_input_is_not_submitted() {
        let mut app = app();
        type_text(&mut app, "   ");
        assert_eq!(press(&mut app, KeyCode::Enter), None);
        assert_eq!(app.input, "   ");
    }

    #[test]
    fn test_enter_ignored_while_busy() {
        let mut app = app();
        app.session
            .state()
            .lock()
            .transition(|phase| phase.on_submit())
            .unwrap();
        type_text(&mut app, "second");

        assert_eq!(press(&mut app, KeyCode::Enter), None);
        assert_eq!(app.input, "second");
    }

    #[tokio::test]
    async fn test_enter_ignored_before_spawned_exchange_starts() {
        let mut app = app();
        app.exchange = Some(tokio::spawn(std::future::pending::<()>()));
        assert!(!app.session.state().is_busy());

        type_text(&mut app, "pasted second line");
        assert_eq!(press(&mut app, KeyCode::Enter), None);
        assert_eq!(app.input, "pasted second line");

        if let Some(task) = app.exchange.take() {
            task.abort();
        }
    }

    #[tokio::test]
    async fn test_finished_exchange_allows_next_submission() {
        let mut app = app();
        let task = tokio::spawn(async {});
        while !task.is_finished() {
            tokio::task::yield_now().await;
        }
        app.exchange = Some(task);

        type_text(&mut app, "next");
        assert_eq!(press(&mut app, KeyCode::Enter), Some("next".to_string()));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert!(app.input.is_empty());

        let mut app = self::app();
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }
}
