//! Configuration tests
//!
//! Round-trip guards for the TOML writer plus the env > file > default
//! precedence rules.

use super::*;
use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn no_env(_: &str) -> Option<String> {
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// Verify that serialized config can be parsed back.
#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

/// Every field written by `to_toml` must come back with the same value
#[test]
fn test_config_roundtrip_preserves_values() {
    let mut config = Config::default();
    config.endpoint = "https://audit.example.com/chat_stream".to_string();
    config.user_id = "auditor \"7\"".to_string();
    config.session_id = "s-42".to_string();
    config.connect_timeout_secs = 3;
    config.idle_timeout_secs = 45;
    config.typewriter.tick_ms = 12;
    config.logging.level = "debug".to_string();
    config.logging.file_enabled = true;
    config.logging.file_dir = PathBuf::from("C:\\logs\\audit");
    config.logging.file_rotation = LogRotation::Hourly;
    config.logging.file_prefix = "console".to_string();

    let file: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    let reloaded = Config::from_sources(file, no_env);

    assert_eq!(reloaded.endpoint, config.endpoint);
    assert_eq!(reloaded.user_id, config.user_id);
    assert_eq!(reloaded.session_id, config.session_id);
    assert_eq!(reloaded.connect_timeout_secs, 3);
    assert_eq!(reloaded.idle_timeout_secs, 45);
    assert_eq!(reloaded.typewriter.tick_ms, 12);
    assert_eq!(reloaded.logging.level, "debug");
    assert!(reloaded.logging.file_enabled);
    assert_eq!(reloaded.logging.file_dir, PathBuf::from("C:\\logs\\audit"));
    assert_eq!(reloaded.logging.file_rotation, LogRotation::Hourly);
    assert_eq!(reloaded.logging.file_prefix, "console");
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_defaults_when_nothing_set() {
    let config = Config::from_sources(FileConfig::default(), no_env);

    assert_eq!(config.endpoint, "http://127.0.0.1:8001/chat_stream");
    assert_eq!(config.user_id, "default_user");
    assert_eq!(config.session_id, "session_1");
    assert_eq!(config.typewriter.cadence(), Duration::from_millis(4));
    assert_eq!(config.idle_timeout(), Duration::from_secs(120));
    assert!(config.enable_tui);
    assert!(!config.demo_mode);
}

#[test]
fn test_file_overrides_defaults() {
    let file: FileConfig = toml::from_str(
        r#"
endpoint = "http://10.0.0.5:9000/chat_stream"
session_id = "night-shift"

[typewriter]
tick_ms = 20
"#,
    )
    .unwrap();
    let config = Config::from_sources(file, no_env);

    assert_eq!(config.endpoint, "http://10.0.0.5:9000/chat_stream");
    assert_eq!(config.session_id, "night-shift");
    assert_eq!(config.user_id, "default_user");
    assert_eq!(config.typewriter.tick_ms, 20);
}

#[test]
fn test_env_overrides_file() {
    let file: FileConfig = toml::from_str(
        r#"
endpoint = "http://file-host/chat_stream"
user_id = "from-file"

[typewriter]
tick_ms = 20
"#,
    )
    .unwrap();
    let env = env_from(&[
        ("AUDIT_CONSOLE_ENDPOINT", "http://env-host/chat_stream"),
        ("AUDIT_CONSOLE_TICK_MS", "2"),
        ("AUDIT_CONSOLE_NO_TUI", "1"),
        ("AUDIT_CONSOLE_DEMO", "TRUE"),
    ]);
    let config = Config::from_sources(file, env);

    assert_eq!(config.endpoint, "http://env-host/chat_stream");
    assert_eq!(config.user_id, "from-file");
    assert_eq!(config.typewriter.tick_ms, 2);
    assert!(!config.enable_tui);
    assert!(config.demo_mode);
}

#[test]
fn test_unparsable_tick_env_is_ignored() {
    let env = env_from(&[("AUDIT_CONSOLE_TICK_MS", "fast")]);
    let config = Config::from_sources(FileConfig::default(), env);
    assert_eq!(config.typewriter.tick_ms, 4);
}

#[test]
fn test_zero_values_are_clamped() {
    let mut config = Config::default();
    config.typewriter.tick_ms = 0;
    config.idle_timeout_secs = 0;
    config.connect_timeout_secs = 0;

    assert_eq!(config.typewriter.cadence(), Duration::from_millis(1));
    assert_eq!(config.idle_timeout(), Duration::from_secs(1));
    assert_eq!(config.connect_timeout(), Duration::from_secs(1));
}

#[test]
fn test_session_config_carries_identity() {
    let env = env_from(&[
        ("AUDIT_CONSOLE_USER_ID", "u-9"),
        ("AUDIT_CONSOLE_SESSION_ID", "s-9"),
    ]);
    let session = Config::from_sources(FileConfig::default(), env).session_config();

    assert_eq!(session.user_id, "u-9");
    assert_eq!(session.session_id, "s-9");
    assert_eq!(session.idle_timeout, Duration::from_secs(120));
}

#[test]
fn test_log_rotation_parse() {
    assert_eq!(LogRotation::parse("HOURLY"), LogRotation::Hourly);
    assert_eq!(LogRotation::parse("never"), LogRotation::Never);
    assert_eq!(LogRotation::parse("weekly"), LogRotation::Daily);
}
