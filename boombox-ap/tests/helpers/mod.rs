//! Shared test doubles: a recording audio engine and notifier

#![allow(dead_code)]

use boombox_ap::playback::engine::{EngineEventSender, RunId};
use boombox_ap::playback::{AudioEngine, EngineEvent, Notifier};
use boombox_common::db::Track;
use boombox_common::events::PlayState;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Command as seen by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Play(RunId, PathBuf),
    Pause,
    Resume,
    Stop,
}

/// Engine double recording every command
///
/// With an event sender attached it behaves like a healthy engine: each
/// `play` is confirmed with `TrackStarted`, and replacing or stopping a run
/// reports its `TrackEnded`.
#[derive(Clone, Default)]
pub struct RecordingEngine {
    pub calls: Arc<Mutex<Vec<EngineCall>>>,
    events: Option<EngineEventSender>,
    active: Arc<Mutex<Option<RunId>>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that answers commands through `events`
    pub fn responsive(events: EngineEventSender) -> Self {
        Self {
            events: Some(events),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn plays(&self) -> Vec<(RunId, PathBuf)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Play(run, path) => Some((run, path)),
                _ => None,
            })
            .collect()
    }

    pub fn last_play(&self) -> (RunId, PathBuf) {
        self.plays().pop().expect("no play command issued")
    }

    fn send(&self, event: EngineEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    fn end_active(&self) {
        if let Some(run) = self.active.lock().unwrap().take() {
            self.send(EngineEvent::TrackEnded { run });
        }
    }
}

impl AudioEngine for RecordingEngine {
    fn play(&mut self, run: RunId, path: &Path) {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::Play(run, path.to_path_buf()));
        self.end_active();
        *self.active.lock().unwrap() = Some(run);
        self.send(EngineEvent::TrackStarted {
            run,
            path: path.to_path_buf(),
        });
    }

    fn pause(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Pause);
    }

    fn resume(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Resume);
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Stop);
        self.end_active();
    }
}

/// Notifier double keeping every emission
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub emitted: Arc<Mutex<Vec<(PlayState, Option<String>)>>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.emitted.lock().unwrap().len()
    }

    pub fn last(&self) -> (PlayState, Option<String>) {
        self.emitted
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("nothing emitted")
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, playstate: PlayState, error: Option<String>) {
        self.emitted.lock().unwrap().push((playstate, error));
    }
}

pub const MEDIA_ROOT: &str = "/srv/boombox";

pub fn track(id: &str, album: &str, number: i64) -> Track {
    Track {
        id: id.to_string(),
        title: format!("Track {}", id.to_uppercase()),
        filename: format!("audio/mp3/artist/{}/track{:02}.cdda.mp3", album, number),
        number,
        album_id: album.to_string(),
        artist_id: "artist".to_string(),
        length_seconds: 180.0,
    }
}

pub fn resolved(track: &Track) -> PathBuf {
    Path::new(MEDIA_ROOT).join(&track.filename)
}
