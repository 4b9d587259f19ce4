//! Push channel message types and the EventBus
//!
//! Every playback transition produces one [`PushMessage`]. On the wire:
//!
//! ```text
//! { "type": "playevent",
//!   "playstate": { "playing": bool, "prev": Track|false,
//!                  "next": Track|false, "track": Track|false } }
//! ```
//!
//! `false` marks an absent track; legacy clients rely on it.

use crate::db::Track;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::sync::broadcast;

/// What the client is told is currently playing
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NowPlaying {
    /// Nothing (serialized as `false`)
    #[default]
    Absent,
    /// A queue entry
    Track(Track),
    /// The engine reported a file the queue does not contain
    /// (serialized as `{"filename": ...}`)
    Unresolved { filename: String },
}

impl NowPlaying {
    pub fn track(&self) -> Option<&Track> {
        match self {
            NowPlaying::Track(track) => Some(track),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, NowPlaying::Absent)
    }
}

impl From<Option<Track>> for NowPlaying {
    fn from(track: Option<Track>) -> Self {
        track.map(NowPlaying::Track).unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize)]
struct UnresolvedWire {
    filename: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NowPlayingWire {
    Track(Track),
    Unresolved(UnresolvedWire),
    Flag(bool),
}

impl Serialize for NowPlaying {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NowPlaying::Absent => serializer.serialize_bool(false),
            NowPlaying::Track(track) => track.serialize(serializer),
            NowPlaying::Unresolved { filename } => UnresolvedWire {
                filename: filename.clone(),
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for NowPlaying {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match NowPlayingWire::deserialize(deserializer)? {
            NowPlayingWire::Track(track) => NowPlaying::Track(track),
            NowPlayingWire::Unresolved(u) => NowPlaying::Unresolved { filename: u.filename },
            NowPlayingWire::Flag(_) => NowPlaying::Absent,
        })
    }
}

/// `Option<Track>` as `Track | false`
mod track_or_false {
    use super::Track;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Track(Track),
        Flag(bool),
    }

    pub fn serialize<S: Serializer>(track: &Option<Track>, serializer: S) -> Result<S::Ok, S::Error> {
        match track {
            Some(track) => track.serialize(serializer),
            None => serializer.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Track>, D::Error> {
        Ok(match Wire::deserialize(deserializer)? {
            Wire::Track(track) => Some(track),
            Wire::Flag(_) => None,
        })
    }
}

/// Snapshot of the playback session as seen by the client
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayState {
    pub playing: bool,
    #[serde(with = "track_or_false")]
    pub prev: Option<Track>,
    #[serde(with = "track_or_false")]
    pub next: Option<Track>,
    pub track: NowPlaying,
}

/// One message on the push channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PushMessage {
    /// Playback state changed
    PlayEvent {
        playstate: PlayState,
        /// Engine failure detail, present only on error transitions
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl PushMessage {
    pub fn play_event(playstate: PlayState) -> Self {
        PushMessage::PlayEvent {
            playstate,
            error: None,
        }
    }

    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            PushMessage::PlayEvent { .. } => "playevent",
        }
    }
}

/// Central distribution bus for push messages
///
/// Wraps `tokio::broadcast`: publishing never blocks, slow subscribers lag
/// and lose old messages, and dropped subscribers are cleaned up
/// automatically.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PushMessage>,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` messages per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future messages
    pub fn subscribe(&self) -> broadcast::Receiver<PushMessage> {
        self.tx.subscribe()
    }

    /// Emit a message to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        message: PushMessage,
    ) -> Result<usize, broadcast::error::SendError<PushMessage>> {
        self.tx.send(message)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
