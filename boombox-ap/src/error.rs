//! Error types for boombox-ap
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for boombox-ap
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog store or release import errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] boombox_common::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// External audio engine could not be started or commanded
    #[error("Audio engine error: {0}")]
    Engine(String),

    /// The playback session task is no longer running
    #[error("Playback session closed")]
    SessionClosed,
}

/// Convenience Result type using boombox-ap Error
pub type Result<T> = std::result::Result<T, Error>;
