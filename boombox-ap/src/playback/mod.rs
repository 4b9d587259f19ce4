//! Playback session: queue, engine adapter, controller and notifications

pub mod controller;
pub mod emitter;
pub mod engine;
pub mod mpg123;
pub mod queue;
pub mod session;

pub use controller::{Controller, SessionState};
pub use emitter::{Emitter, Notifier};
pub use engine::{AudioEngine, EngineEvent, RunId};
pub use mpg123::Mpg123Engine;
pub use queue::TrackQueue;
pub use session::SessionHandle;
