//! Unit tests for configuration loading and graceful degradation
//!
//! - Missing TOML files SHALL NOT cause termination
//! - Invalid TOML files fall back to defaults with a warning
//! - The default config location follows the platform config dir
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that manipulate XDG_CONFIG_HOME are marked with #[serial].

use boombox_common::config::{default_config_path, TomlConfig, DEFAULT_PORT};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_missing_explicit_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let config = TomlConfig::load_or_default(Some(&missing));

    assert_eq!(config.resolve_port(None), DEFAULT_PORT);
    assert_eq!(config.engine.program, "mpg123");
}

#[test]
fn test_invalid_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "port = [this is not toml").unwrap();

    let config = TomlConfig::load_or_default(Some(&path));

    assert_eq!(config.port, None);
    assert_eq!(config.resolve_port(None), DEFAULT_PORT);
}

#[test]
fn test_explicit_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        port = 5740
        media_root = "/srv/boombox"
        database_path = "/srv/boombox/catalog.db"

        [engine]
        command_timeout_ms = 1500
        "#,
    )
    .unwrap();

    let config = TomlConfig::from_file(&path).unwrap();

    assert_eq!(config.resolve_port(None), 5740);
    assert_eq!(config.resolve_media_root(None), PathBuf::from("/srv/boombox"));
    assert_eq!(
        config.resolve_database_path(None),
        PathBuf::from("/srv/boombox/catalog.db")
    );
    assert_eq!(config.engine.command_timeout_ms, 1500);
    // Unspecified engine fields keep their defaults
    assert_eq!(config.engine.program, "mpg123");
}

#[test]
#[serial]
#[cfg(target_os = "linux")]
fn test_default_location_is_discovered() {
    let dir = TempDir::new().unwrap();
    let original = env::var("XDG_CONFIG_HOME").ok();
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let config_dir = dir.path().join("boombox");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "port = 6001\n").unwrap();

    assert_eq!(default_config_path(), Some(config_dir.join("config.toml")));
    let config = TomlConfig::load_or_default(None);
    assert_eq!(config.resolve_port(None), 6001);

    match original {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }
}

#[test]
#[serial]
#[cfg(target_os = "linux")]
fn test_no_file_at_default_location_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let original = env::var("XDG_CONFIG_HOME").ok();
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let config = TomlConfig::load_or_default(None);
    assert!(config.port.is_none());
    assert!(config.media_root.is_none());

    match original {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }
}
