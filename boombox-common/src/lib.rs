//! # Boombox Common Library
//!
//! Shared code for the Boombox media server:
//! - Catalog models and SQLite queries (artists, albums, tracks)
//! - Release import (collating disc-ripper output into catalog records)
//! - Push channel message types and the EventBus
//! - SSE helpers
//! - Bootstrap configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod release;
pub mod sse;

pub use error::{Error, Result};
