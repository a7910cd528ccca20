// Startup module - banner and link summary
//
// Printed to stderr before the console takes over the screen (or before the
// line prompt starts). stdout is left to the kernel log and transcript so
// `ask` output can be piped.

use crate::config::{Config, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// One line of the link summary
struct LinkStatus {
    label: &'static str,
    value: String,
    ok: bool,
}

fn link_status(config: &Config) -> Vec<LinkStatus> {
    vec![
        LinkStatus {
            label: "endpoint",
            value: if config.demo_mode {
                "demo stream (no network)".to_string()
            } else {
                config.endpoint.clone()
            },
            ok: true,
        },
        LinkStatus {
            label: "identity",
            value: format!("{} / {}", config.user_id, config.session_id),
            ok: true,
        },
        LinkStatus {
            label: "typewriter",
            value: format!("{} ms per character", config.typewriter.cadence().as_millis()),
            ok: true,
        },
        LinkStatus {
            label: "file logs",
            value: if config.logging.file_enabled {
                config.logging.file_dir.display().to_string()
            } else {
                "off".to_string()
            },
            ok: config.logging.file_enabled,
        },
    ]
}

/// Print the startup banner and link summary
pub fn print_startup(config: &Config) {
    use colors::*;

    eprintln!();
    eprintln!("  {BOLD}{CYAN}Smart Audit Console{RESET} {DIM}v{VERSION}{RESET}");
    eprintln!("  {DIM}Orchestrator prototype front end{RESET}");
    eprintln!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            eprintln!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            eprintln!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    eprintln!();

    for status in link_status(config) {
        let (icon, style) = if status.ok {
            (format!("{GREEN}✓{RESET}"), "")
        } else {
            (format!("{DIM}○{RESET}"), DIM)
        };
        eprintln!(
            "    {icon} {style}{:<12}{RESET} {DIM}{}{RESET}",
            status.label, status.value
        );
    }
    eprintln!();

    if config.demo_mode {
        eprintln!("  {YELLOW}▸{RESET} {YELLOW}Demo mode active{RESET} {DIM}(canned agent stream){RESET}");
    } else {
        eprintln!("  {MAGENTA}▸{RESET} Linking to {BOLD}{}{RESET}", config.endpoint);
    }
    eprintln!();
}

/// Boot sequence for the TUI status line
pub fn log_startup(config: &Config) {
    tracing::info!("Smart Audit Console v{}", VERSION);
    for status in link_status(config) {
        let icon = if status.ok { "✓" } else { "○" };
        tracing::info!("{} {} - {}", icon, status.label, status.value);
    }
    tracing::info!("Ready. Awaiting command...");
}
