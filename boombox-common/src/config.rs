//! Bootstrap configuration and path resolution
//!
//! Values are resolved in priority order:
//! 1. Command-line argument (highest priority, includes its env var via clap)
//! 2. TOML config file
//! 3. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal: a warning is logged and
//! compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Legacy media root, where ripped audio was served from
pub const DEFAULT_MEDIA_ROOT: &str = "/var/www/Server/boombox/www/";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Default deadline for the engine to confirm a `play` command
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional in the file; absent fields fall back to the
/// compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: Option<u16>,

    /// Directory that track filenames are relative to
    pub media_root: Option<PathBuf>,

    /// SQLite catalog database path
    pub database_path: Option<PathBuf>,

    /// Audio engine process settings
    pub engine: EngineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// External audio engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine executable (must speak the mpg123 remote-control protocol)
    pub program: String,

    /// Arguments passed to the engine
    pub args: Vec<String>,

    /// How long to wait for the engine to report a started track
    pub command_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "mpg123".to_string(),
            args: vec!["-R".to_string()],
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter directive (e.g. "info", "boombox_ap=debug")
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file
    ///
    /// Fails only if the file exists but cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration with graceful degradation
    ///
    /// An explicit path that is missing or invalid, or no path and no file at
    /// the default location, yields compiled defaults plus a warning.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    info!("No config file found, using compiled defaults");
                    return Self::default();
                }
            },
        };

        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Could not load config {}: {} (using defaults)", path.display(), e);
                Self::default()
            }
        }
    }

    /// Resolve the HTTP port
    pub fn resolve_port(&self, cli: Option<u16>) -> u16 {
        cli.or(self.port).unwrap_or(DEFAULT_PORT)
    }

    /// Resolve the media root
    pub fn resolve_media_root(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.media_root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    /// Resolve the catalog database path
    pub fn resolve_database_path(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.database_path.clone())
            .unwrap_or_else(default_database_path)
    }
}

/// Default configuration file location for the platform
///
/// `~/.config/boombox/config.toml` on Linux, the platform config dir elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("boombox").join("config.toml"))
}

/// Default catalog database location for the platform
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("boombox").join("boombox.db"))
        .unwrap_or_else(|| PathBuf::from("./boombox_data/boombox.db"))
}
