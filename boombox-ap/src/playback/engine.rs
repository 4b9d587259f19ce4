//! Audio engine adapter interface
//!
//! The controller commands an external renderer through [`AudioEngine`] and
//! hears back through a stream of [`EngineEvent`]s. Commands are
//! fire-and-forget; failures surface only as `EngineEvent::Error`.
//!
//! Every `play` opens a new playback *run*. Events carry the run they belong
//! to so the controller can discard notifications that raced with a newer
//! command.

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Identifies one `play` command and everything the engine reports about it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RunId(pub u64);

impl RunId {
    pub fn next(self) -> Self {
        RunId(self.0 + 1)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Notification raised by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Audio for `path` actually began rendering
    TrackStarted { run: RunId, path: PathBuf },

    /// The run finished, naturally or because it was stopped or replaced.
    /// Sent exactly once per run.
    TrackEnded { run: RunId },

    /// Engine failure; `run` is `None` when not attributable to a run
    /// (e.g. the engine process died)
    Error { run: Option<RunId>, detail: String },
}

/// Sending half of the engine event channel, handed to an engine once
pub type EngineEventSender = mpsc::UnboundedSender<EngineEvent>;

/// Receiving half, consumed by the session actor
pub type EngineEventReceiver = mpsc::UnboundedReceiver<EngineEvent>;

/// Create the channel an engine reports through
pub fn event_channel() -> (EngineEventSender, EngineEventReceiver) {
    mpsc::unbounded_channel()
}

/// Commands the controller issues to the audio renderer
///
/// Implementations must not block: anything slow happens on the engine's own
/// tasks and is reported back as an [`EngineEvent`].
pub trait AudioEngine: Send {
    /// Start rendering `path` as run `run`, replacing whatever is playing
    fn play(&mut self, run: RunId, path: &Path);

    fn pause(&mut self);

    fn resume(&mut self);

    /// Stop the active run; its `TrackEnded` follows
    fn stop(&mut self);
}
