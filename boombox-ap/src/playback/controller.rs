//! Playback session controller
//!
//! Owns the [`TrackQueue`], commands the [`AudioEngine`] and reconciles the
//! engine's asynchronous events with its own view of the session. Every
//! visible transition is pushed through the [`Notifier`].
//!
//! States: `Empty` → `Playing` ⇄ `Paused`, with `Stopped` reachable from
//! both. `Playing` is entered as soon as a `play` is issued; the `playing`
//! flag of the snapshot only turns true once the engine confirms the run
//! started.
//!
//! The controller never blocks: it is driven one call at a time by the
//! session actor (see [`crate::playback::session`]).

use crate::playback::emitter::Notifier;
use crate::playback::engine::{AudioEngine, EngineEvent, RunId};
use crate::playback::queue::TrackQueue;
use boombox_common::db::Track;
use boombox_common::events::{NowPlaying, PlayState};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Coarse session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing queued
    Empty,
    /// Queue and cursor kept, engine idle
    Stopped,
    /// A run is commanded or rendering
    Playing,
    Paused,
}

/// The run most recently commanded
#[derive(Debug, Clone, Copy)]
struct ActiveRun {
    id: RunId,
    /// Queue index the run was commanded for (kept valid across removals
    /// until the run starts)
    index: usize,
    started: bool,
    /// Start confirmation deadline
    deadline: Instant,
}

pub struct Controller {
    queue: TrackQueue,
    engine: Box<dyn AudioEngine>,
    notifier: Box<dyn Notifier>,
    state: SessionState,
    playing: bool,
    active: Option<ActiveRun>,
    last_run: RunId,
    /// Engine path reported for a run the queue could not place
    unresolved: Option<PathBuf>,
    /// Run ended or failed; the cursor is kept but no track is current
    idle: bool,
    command_timeout: Duration,
}

impl Controller {
    pub fn new(
        media_root: impl Into<PathBuf>,
        engine: Box<dyn AudioEngine>,
        notifier: Box<dyn Notifier>,
        command_timeout: Duration,
    ) -> Self {
        Self {
            queue: TrackQueue::new(media_root),
            engine,
            notifier,
            state: SessionState::Empty,
            playing: false,
            active: None,
            last_run: RunId::default(),
            unresolved: None,
            idle: false,
            command_timeout,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    /// Client view of the session
    pub fn snapshot(&self) -> PlayState {
        let track = if self.idle {
            NowPlaying::Absent
        } else {
            match &self.unresolved {
                Some(path) => NowPlaying::Unresolved {
                    filename: path.display().to_string(),
                },
                None => self.queue.current().cloned().into(),
            }
        };
        PlayState {
            playing: self.playing,
            prev: self.queue.previous().cloned(),
            next: self.queue.next().cloned(),
            track,
        }
    }

    /// When the pending `play` must have been confirmed by
    pub fn deadline(&self) -> Option<Instant> {
        self.active.filter(|run| !run.started).map(|run| run.deadline)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Superseding play request: replace the queue with `tracks` and start
    pub fn play_tracks(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            self.clear();
            return;
        }
        info!("Play request for {} track(s)", tracks.len());

        self.halt();
        self.queue.clear();
        let first = self.queue.extend(tracks);
        self.play_index(first);
    }

    /// Append `tracks`; start on the first of them if nothing is running
    pub fn enqueue(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        info!("Enqueue {} track(s)", tracks.len());

        let first = self.queue.extend(tracks);
        match self.state {
            SessionState::Empty | SessionState::Stopped => self.play_index(first),
            SessionState::Playing | SessionState::Paused => self.emit(None),
        }
    }

    /// Resume a stopped session from the preserved cursor
    pub fn start(&mut self) {
        if self.state != SessionState::Stopped {
            debug!("start ignored in state {:?}", self.state);
            return;
        }
        let index = self.queue.cursor().unwrap_or(0);
        self.play_index(index);
    }

    pub fn pause(&mut self) {
        if self.state != SessionState::Playing || !self.playing {
            debug!("pause ignored in state {:?}", self.state);
            return;
        }
        self.engine.pause();
        self.playing = false;
        self.state = SessionState::Paused;
        info!("Paused");
        self.emit(None);
    }

    pub fn resume(&mut self) {
        if self.state != SessionState::Paused {
            debug!("resume ignored in state {:?}", self.state);
            return;
        }
        self.engine.resume();
        self.playing = true;
        self.state = SessionState::Playing;
        info!("Resumed");
        self.emit(None);
    }

    /// Play the track after the current (or pending) one
    pub fn next(&mut self) {
        match self.position() {
            Some(position) if position + 1 < self.queue.len() => self.play_index(position + 1),
            _ => debug!("next ignored: no next track"),
        }
    }

    /// Play the previous track; at the head of the queue, restart it
    pub fn prev(&mut self) {
        match self.position() {
            Some(0) => self.play_index(0),
            Some(position) => self.play_index(position - 1),
            None => debug!("prev ignored: nothing has played"),
        }
    }

    /// Stop the engine, keeping queue and cursor
    pub fn stop(&mut self) {
        if !matches!(self.state, SessionState::Playing | SessionState::Paused) {
            debug!("stop ignored in state {:?}", self.state);
            return;
        }
        self.halt();
        self.state = SessionState::Stopped;
        info!("Stopped");
        self.emit(None);
    }

    /// Stop if needed and empty the queue
    pub fn clear(&mut self) {
        self.halt();
        self.queue.clear();
        self.state = SessionState::Empty;
        info!("Queue cleared");
        self.emit(None);
    }

    /// Remove the first queued track with `track_id`
    pub fn remove(&mut self, track_id: &str) {
        let position = self.position();
        let Some(index) = self.queue.remove_by_id(track_id) else {
            debug!("remove ignored: {} not queued", track_id);
            return;
        };

        if let Some(run) = self.active.as_mut().filter(|run| !run.started) {
            if index < run.index {
                run.index -= 1;
            }
        }

        if position == Some(index) {
            match self.state {
                SessionState::Playing if index < self.queue.len() => {
                    info!("Removed the current track, moving on");
                    self.play_index(index);
                }
                SessionState::Playing | SessionState::Paused => {
                    info!("Removed the current track, stopping");
                    self.halt();
                    self.state = SessionState::Stopped;
                }
                SessionState::Empty | SessionState::Stopped => {}
            }
        }

        if self.queue.is_empty() && self.state == SessionState::Stopped {
            self.state = SessionState::Empty;
        }
        self.emit(None);
    }

    // ------------------------------------------------------------------
    // Engine events
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: EngineEvent) {
        debug!("Engine event: {:?}", event);
        match event {
            EngineEvent::TrackStarted { run, path } => self.on_track_started(run, &path),
            EngineEvent::TrackEnded { run } => self.on_track_ended(run),
            EngineEvent::Error { run, detail } => self.on_error(run, detail),
        }
    }

    /// The pending `play` was never confirmed
    pub fn on_deadline(&mut self, now: Instant) {
        let Some(run) = self.active.filter(|run| !run.started && now >= run.deadline) else {
            return;
        };
        let detail = format!(
            "engine did not start playback within {} ms",
            self.command_timeout.as_millis()
        );
        warn!("{} not confirmed: {}", run.id, detail);
        self.fail(detail);
        // Keep a late start from rendering over a stopped session
        self.engine.stop();
    }

    fn on_track_started(&mut self, run: RunId, path: &Path) {
        let Some(active) = self.active.as_mut().filter(|active| active.id == run) else {
            debug!("Ignoring start of stale {}", run);
            return;
        };
        if active.started {
            debug!("Ignoring repeated start of {}", run);
            return;
        }
        active.started = true;
        let commanded = active.index;
        self.idle = false;

        let index = Some(commanded)
            .filter(|&i| self.queue.resolve(i).as_deref() == Some(path))
            .or_else(|| self.queue.locate_by_filename(path));

        match index {
            Some(index) => {
                self.queue.set_cursor(index);
                self.unresolved = None;
                info!("Now playing #{}: {}", index, path.display());
            }
            None => {
                warn!("Engine is playing {} which is not queued", path.display());
                self.queue.reset_cursor();
                self.unresolved = Some(path.to_path_buf());
            }
        }

        self.playing = true;
        self.emit(None);
    }

    fn on_track_ended(&mut self, run: RunId) {
        if self.active.map(|active| active.id) != Some(run)
            || !matches!(self.state, SessionState::Playing | SessionState::Paused)
        {
            debug!("Ignoring end of stale {}", run);
            return;
        }
        info!("Track ended ({})", run);

        self.active = None;
        self.playing = false;
        self.unresolved = None;
        self.idle = true;
        self.emit(None);

        match self.queue.cursor() {
            Some(cursor) if cursor + 1 < self.queue.len() => self.play_index(cursor + 1),
            _ => {
                info!("End of queue");
                self.state = SessionState::Stopped;
            }
        }
    }

    fn on_error(&mut self, run: Option<RunId>, detail: String) {
        if let Some(run) = run {
            if self.active.map(|active| active.id) != Some(run) {
                debug!("Ignoring error from stale {}: {}", run, detail);
                return;
            }
        }
        error!("Playback failed: {}", detail);
        self.fail(detail);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Index the session is at or heading to
    fn position(&self) -> Option<usize> {
        match self.active {
            Some(run) if !run.started => Some(run.index),
            _ => self.queue.cursor(),
        }
    }

    /// Command the engine to play the element at `index`
    fn play_index(&mut self, index: usize) {
        let Some(path) = self.queue.resolve(index) else {
            warn!("No queued track at #{}, nothing to play", index);
            return;
        };
        self.last_run = self.last_run.next();
        let run = self.last_run;

        self.active = Some(ActiveRun {
            id: run,
            index,
            started: false,
            deadline: Instant::now() + self.command_timeout,
        });
        self.state = SessionState::Playing;
        self.idle = false;
        info!("Play #{} {} ({})", index, path.display(), run);
        self.engine.play(run, &path);
    }

    /// Stop the engine if a run is going and forget the run
    fn halt(&mut self) {
        if matches!(self.state, SessionState::Playing | SessionState::Paused) {
            self.engine.stop();
        }
        self.active = None;
        self.playing = false;
        self.unresolved = None;
    }

    /// Engine failure: forced to `Stopped`, client told why
    fn fail(&mut self, detail: String) {
        self.active = None;
        self.playing = false;
        self.unresolved = None;
        self.idle = true;
        if self.state != SessionState::Empty {
            self.state = SessionState::Stopped;
        }
        self.emit(Some(detail));
    }

    fn emit(&self, error: Option<String>) {
        self.notifier.notify(self.snapshot(), error);
    }
}
