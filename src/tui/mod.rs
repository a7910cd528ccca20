// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, state and typewriter notifications)
// - Spawning an exchange when the user submits a query
//
// Redraws are coalesced: notifications only mark the screen dirty, and a
// dirty screen is drawn on the next frame tick.

pub mod app;
pub mod components;
pub mod scroll;
pub mod theme;
pub mod ui;

use crate::error::SubmitError;
use crate::logging::LogBuffer;
use crate::session::Session;
use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Frame interval for coalesced redraws (~30 FPS)
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// even when the loop fails.
pub async fn run_tui(session: Session, log_buffer: LogBuffer) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(session, log_buffer);
    let result = run_event_loop(&mut terminal, &mut app).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Drop everything queued on `rx`; one pending redraw covers them all
fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) {
    while rx.try_recv().is_ok() {}
}

/// Main event loop
///
/// Waits on four sources at once:
/// 1. Terminal input (keys, resize)
/// 2. Conversation state changes
/// 3. Characters revealed by the typewriter
/// 4. Frame ticks, which draw if anything changed
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut state_rx = app.session.state().subscribe();
    let mut typing_rx = app.session.typewriter().subscribe();

    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut dirty = true;

    loop {
        tokio::select! {
            biased;

            maybe_event = events.next() => match maybe_event {
                // Only handle Press events (not Release or Repeat)
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(query) = app.handle_key(key) {
                        app.exchange = Some(spawn_exchange(app.session.clone(), query));
                    }
                    dirty = true;
                }
                Some(Ok(Event::Resize(_, _))) => dirty = true,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => break,
            },

            Some(_) = state_rx.recv() => {
                drain(&mut state_rx);
                dirty = true;
            }

            Some(_) = typing_rx.recv() => {
                drain(&mut typing_rx);
                dirty = true;
            }

            _ = frames.tick() => {
                app.tick_animation();
                // Spinner and cursor animate while anything is in motion
                if dirty || app.is_busy() || app.cursor_toggled() {
                    terminal
                        .draw(|f| ui::draw(f, app))
                        .context("Failed to draw terminal")?;
                    dirty = false;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Run one exchange in the background; the session reports its own outcome
fn spawn_exchange(session: Session, query: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        match session.submit(&query).await {
            Ok(summary) if summary.is_success() => {
                tracing::debug!("Exchange finished with {} events", summary.events)
            }
            Ok(_) => {}
            Err(SubmitError::Busy) => tracing::debug!("Submission dropped: exchange in flight"),
            Err(e) => tracing::debug!("Submission rejected: {}", e),
        }
    })
}
