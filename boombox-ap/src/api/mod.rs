//! HTTP API for the audio player
//!
//! Playback commands, read-only catalog lookups and the SSE push channel,
//! all under `/api/v1`.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};
