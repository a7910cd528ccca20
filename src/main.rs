// Smart Audit Console - terminal front end for a multi-agent orchestrator
//
// Sends the operator's query to the orchestrator's streaming endpoint and
// renders the agents' incremental output as it arrives.
//
// Architecture:
// - Stream + parser: byte chunks -> frames -> typed agent events
// - Session: one exchange at a time, routes events into shared state
// - Typewriter: paced reveal of the execution kernel log
// - TUI (ratatui) or headless renderer: observe state and redraw
//
// Everything runs on a single-threaded runtime; the typewriter drain task
// and the exchange in flight interleave at their await points.

mod cli;
mod config;
mod demo;
mod error;
mod headless;
mod logging;
mod observer;
mod parser;
mod session;
mod startup;
mod state;
mod stream;
mod tui;
mod typewriter;
mod util;

use anyhow::{Context, Result};
use cli::RunMode;
use config::Config;
use logging::LogBuffer;
use session::transport::{ChatTransport, HttpTransport};
use session::Session;
use state::SharedState;
use std::sync::Arc;
use typewriter::TypewriterHandle;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Handle config commands first; they exit early
    let Some(mode) = cli::handle_cli() else {
        return Ok(());
    };

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    let demo_flag = match &mode {
        RunMode::Interactive { demo } | RunMode::Ask { demo, .. } => *demo,
    };
    config.demo_mode |= demo_flag;

    let use_tui = config.enable_tui && matches!(mode, RunMode::Interactive { .. });

    // In TUI mode logs are captured to a buffer so they don't garble the
    // display; otherwise they go to stderr.
    // The guard must be kept alive so file logs flush.
    let log_buffer = LogBuffer::new();
    let file_guard = logging::init(&config.logging, use_tui.then_some(&log_buffer));

    let transport: Arc<dyn ChatTransport> = if config.demo_mode {
        tracing::info!("Running in DEMO MODE - replaying canned agent stream");
        Arc::new(demo::DemoTransport::new())
    } else {
        Arc::new(
            HttpTransport::new(config.connect_timeout())
                .context("Failed to create HTTP client")?,
        )
    };

    let typewriter = TypewriterHandle::new();
    let session = Session::new(
        config.session_config(),
        transport,
        SharedState::new(),
        typewriter.clone(),
    );

    // Drain task runs for the life of the process
    let drain_handle = tokio::spawn(typewriter.run(config.typewriter.cadence()));

    let outcome = match mode {
        RunMode::Ask { query, .. } => {
            let summary = headless::run_exchange(&session, &query).await?;
            Ok(summary.is_success())
        }
        RunMode::Interactive { .. } if use_tui => {
            startup::print_startup(&config);
            startup::log_startup(&config);
            tui::run_tui(session, log_buffer).await.map(|()| true)
        }
        RunMode::Interactive { .. } => {
            startup::print_startup(&config);
            tracing::info!("TUI disabled, reading queries from stdin");
            headless::run_repl(session).await.map(|()| true)
        }
    };

    drain_handle.abort();
    drop(file_guard);

    match outcome {
        Ok(true) => Ok(()),
        // Failure was already reported in the transcript
        Ok(false) => std::process::exit(1),
        Err(e) => Err(e),
    }
}
