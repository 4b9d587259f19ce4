//! boombox-ap runtime configuration
//!
//! Assembled once at startup from command-line arguments (which already
//! include their environment variables) and the bootstrap TOML file.

use boombox_common::config::{EngineConfig, TomlConfig};
use std::path::{Path, PathBuf};

/// Push channel buffer per subscriber
pub const EVENT_BUS_CAPACITY: usize = 100;

/// Default log filter when neither RUST_LOG nor the config file sets one
pub const DEFAULT_LOG_FILTER: &str = "boombox_ap=debug,boombox_common=info,tower_http=debug";

/// Audio player configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub media_root: PathBuf,
    pub database_path: PathBuf,
    pub engine: EngineConfig,
    pub event_capacity: usize,
}

impl Config {
    /// Resolve every setting: CLI/env first, then the file, then defaults
    pub fn resolve(
        file: &TomlConfig,
        port: Option<u16>,
        media_root: Option<&Path>,
        database_path: Option<&Path>,
    ) -> Self {
        Self {
            port: file.resolve_port(port),
            media_root: file.resolve_media_root(media_root),
            database_path: file.resolve_database_path(database_path),
            engine: file.engine.clone(),
            event_capacity: EVENT_BUS_CAPACITY,
        }
    }
}

/// Log filter directive from the config file, or the compiled default
pub fn log_filter(file: Option<&TomlConfig>) -> String {
    file.and_then(|f| f.logging.level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}
