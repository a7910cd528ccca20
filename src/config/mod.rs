//! Configuration for the console
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/audit-console/config.toml)
//! 3. Built-in defaults (lowest priority)

use crate::session::SessionConfig;
use crate::typewriter::DEFAULT_CADENCE;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod logging;
mod serialization;

#[cfg(test)]
mod tests;

pub use logging::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8001/chat_stream";
const DEFAULT_USER_ID: &str = "default_user";
const DEFAULT_SESSION_ID: &str = "session_1";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;
const DEFAULT_TICK_MS: u64 = DEFAULT_CADENCE.as_millis() as u64;

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Streaming chat endpoint of the orchestrator
    pub endpoint: String,

    /// User identifier sent with every query
    pub user_id: String,

    /// Session identifier sent with every query
    pub session_id: String,

    /// Bound on establishing the TCP/TLS connection
    pub connect_timeout_secs: u64,

    /// Bound on the gap between two response chunks
    pub idle_timeout_secs: u64,

    /// Whether to run the TUI (otherwise a line-based prompt)
    pub enable_tui: bool,

    /// Demo mode: replay a canned orchestrator stream instead of calling out
    pub demo_mode: bool,

    /// Typewriter pacing
    pub typewriter: TypewriterConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            enable_tui: true,
            demo_mode: false,
            typewriter: TypewriterConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Typewriter pacing for the execution kernel log
#[derive(Debug, Clone)]
pub struct TypewriterConfig {
    /// Milliseconds between two revealed characters
    pub tick_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

/// Typewriter settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileTypewriter {
    pub tick_ms: Option<u64>,
}

impl TypewriterConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileTypewriter>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            tick_ms: file.tick_ms.unwrap_or(DEFAULT_TICK_MS),
        }
    }

    /// Delay between characters; a zero tick is clamped to 1ms
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub endpoint: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,

    /// Optional [typewriter] section
    pub typewriter: Option<FileTypewriter>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Interpret "1"/"true" (any case) as an enabled flag
fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl Config {
    /// Get the config file path: ~/.config/audit-console/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("audit-console").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Silently fail - config is optional
            }
        }

        // Write config (ignore errors - config is optional)
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// Exits the process if the file exists but cannot be read or parsed: a
    /// broken config should fail fast with a clear error, not silently fall
    /// back to defaults while the user debugs the wrong thing.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!(
                        "\n╔══════════════════════════════════════════════════════════════╗"
                    );
                    eprintln!(
                        "║  CONFIG ERROR - Failed to parse configuration file          ║"
                    );
                    eprintln!(
                        "╚══════════════════════════════════════════════════════════════╝\n"
                    );
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Invalid numbers (timeouts and tick_ms are integers)");
                    eprintln!("    - Typos in section names\n");
                    eprintln!("  To reset, run `audit-console config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Self {
        Self::from_sources(Self::load_file_config(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with an environment lookup
    pub(crate) fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let endpoint = env("AUDIT_CONSOLE_ENDPOINT")
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let user_id = env("AUDIT_CONSOLE_USER_ID")
            .or(file.user_id)
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let session_id = env("AUDIT_CONSOLE_SESSION_ID")
            .or(file.session_id)
            .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());

        // Timeouts: file > default
        let connect_timeout_secs = file
            .connect_timeout_secs
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let idle_timeout_secs = file
            .idle_timeout_secs
            .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS);

        // TUI toggle and demo mode: env only (runtime flags)
        let enable_tui = !env("AUDIT_CONSOLE_NO_TUI").is_some_and(|v| is_truthy(&v));
        let demo_mode = env("AUDIT_CONSOLE_DEMO").is_some_and(|v| is_truthy(&v));

        // Typewriter: env > file > default; unparsable env values are ignored
        let mut typewriter = TypewriterConfig::from_file(file.typewriter);
        if let Some(tick_ms) = env("AUDIT_CONSOLE_TICK_MS").and_then(|v| v.parse().ok()) {
            typewriter.tick_ms = tick_ms;
        }

        let logging = LoggingConfig::from_file(file.logging);

        Self {
            endpoint,
            user_id,
            session_id,
            connect_timeout_secs,
            idle_timeout_secs,
            enable_tui,
            demo_mode,
            typewriter,
            logging,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs.max(1))
    }

    /// Settings handed to the session orchestrator
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            endpoint: self.endpoint.clone(),
            user_id: self.user_id.clone(),
            session_id: self.session_id.clone(),
            idle_timeout: self.idle_timeout(),
        }
    }
}
