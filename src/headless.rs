// Headless mode - line-oriented rendering for `ask` and the stdin prompt
//
// The kernel log is echoed to stdout one character at a time as the
// typewriter reveals it, so the pacing matches the TUI. Once the log has
// drained, the exchange's new transcript entries are printed below it.

use crate::session::{ExchangeSummary, Session};
use crate::state::Message;
use crate::typewriter::TypewriterUpdate;
use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const PROMPT: &str = "audit> ";

/// Write one typewriter update to `out`
fn echo(out: &mut impl Write, update: TypewriterUpdate) -> std::io::Result<()> {
    match update {
        TypewriterUpdate::Emitted(c) => write!(out, "{}", c)?,
        TypewriterUpdate::Cleared => writeln!(out)?,
    }
    out.flush()
}

/// Format transcript entries as "role › content" lines
pub fn format_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{} › {}", m.role.label(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run one exchange, echoing the kernel log until it has fully drained
pub async fn run_exchange(session: &Session, query: &str) -> Result<ExchangeSummary> {
    let typewriter = session.typewriter();
    let mut updates = typewriter.subscribe();
    let mut stdout = std::io::stdout();
    let already = session.state().transcript().len();

    let exchange = session.submit(query);
    tokio::pin!(exchange);

    let summary = loop {
        tokio::select! {
            result = &mut exchange => break result.context("Query rejected")?,
            Some(update) = updates.recv() => echo(&mut stdout, update)?,
        }
    };

    // The stream is done; let the typewriter catch up
    loop {
        tokio::select! {
            biased;
            Some(update) = updates.recv() => echo(&mut stdout, update)?,
            _ = typewriter.wait_drained() => break,
        }
    }
    flush_pending(&mut updates, &mut stdout)?;
    writeln!(stdout)?;

    let transcript = session.state().transcript();
    if let Some(new) = transcript.get(already..) {
        writeln!(stdout, "\n{}", format_messages(new))?;
    }
    Ok(summary)
}

fn flush_pending(
    updates: &mut mpsc::UnboundedReceiver<TypewriterUpdate>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    while let Ok(update) = updates.try_recv() {
        echo(out, update)?;
    }
    Ok(())
}

/// Read queries from stdin until EOF or Ctrl+C
pub async fn run_repl(session: Session) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let summary = run_exchange(&session, &line).await?;
        if let Some(e) = summary.failure {
            tracing::warn!("Exchange failed: {}", e);
        }
    }
    Ok(())
}
