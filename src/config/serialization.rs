//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize config to TOML with comments
    ///
    /// Strings go through `{:?}` so quotes and backslashes (Windows paths)
    /// come out escaped the way TOML basic strings expect.
    pub fn to_toml(&self) -> String {
        format!(
            r#"# audit-console configuration
# Precedence: environment variables > this file > built-in defaults

# Streaming chat endpoint of the orchestrator (env: AUDIT_CONSOLE_ENDPOINT)
endpoint = {endpoint:?}

# Identity sent with every query (env: AUDIT_CONSOLE_USER_ID, AUDIT_CONSOLE_SESSION_ID)
user_id = {user_id:?}
session_id = {session_id:?}

# Seconds allowed for establishing the connection
connect_timeout_secs = {connect}

# Seconds allowed between two response chunks before the exchange fails
idle_timeout_secs = {idle}

# Execution kernel log pacing (env: AUDIT_CONSOLE_TICK_MS)
[typewriter]
tick_ms = {tick_ms}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level:?}
# File logging (in addition to TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir:?}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix:?}
"#,
            endpoint = self.endpoint,
            user_id = self.user_id,
            session_id = self.session_id,
            connect = self.connect_timeout_secs,
            idle = self.idle_timeout_secs,
            tick_ms = self.typewriter.tick_ms,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display().to_string(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
