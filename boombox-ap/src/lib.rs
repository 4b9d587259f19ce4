//! # Boombox Audio Player Library (boombox-ap)
//!
//! Playback session for the Boombox media server.
//!
//! **Purpose:** Keep track of what is playing, what came before and what
//! comes next; drive an external audio engine; push every state change to
//! connected clients.
//!
//! **Architecture:** A single session actor owns the controller and its
//! queue. HTTP handlers send it commands, the engine adapter sends it
//! events, and the controller publishes snapshots on the push channel.

pub mod api;
pub mod config;
pub mod error;
pub mod playback;

pub use error::{Error, Result};
