//! Notification emitter
//!
//! Pushes controller snapshots to connected clients. Delivery is best-effort
//! and at-most-once: no acknowledgment, no retry, and with no client
//! connected the message is dropped.

use boombox_common::events::{EventBus, PlayState, PushMessage};
use tracing::debug;

/// Sink for playback state notifications
pub trait Notifier: Send {
    fn notify(&self, playstate: PlayState, error: Option<String>);
}

/// [`Notifier`] publishing `playevent` messages on the [`EventBus`]
#[derive(Clone)]
pub struct Emitter {
    bus: EventBus,
}

impl Emitter {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl Notifier for Emitter {
    fn notify(&self, playstate: PlayState, error: Option<String>) {
        let message = PushMessage::PlayEvent { playstate, error };
        match self.bus.emit(message) {
            Ok(receivers) => debug!("Emitted playevent to {} subscriber(s)", receivers),
            Err(_) => debug!("No push subscribers, playevent dropped"),
        }
    }
}
