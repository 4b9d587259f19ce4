//! Session actor
//!
//! One tokio task owns the [`Controller`] and applies, strictly one at a
//! time, client commands, engine events and the start-confirmation
//! deadline. Request handlers talk to it through a cloneable
//! [`SessionHandle`]; sending a command never waits on the engine.

use crate::error::{Error, Result};
use crate::playback::controller::Controller;
use crate::playback::engine::EngineEventReceiver;
use boombox_common::db::Track;
use boombox_common::events::PlayState;
use std::future;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// Commands accepted by the session
#[derive(Debug)]
pub enum Command {
    PlayTracks(Vec<Track>),
    Enqueue(Vec<Track>),
    Start,
    Pause,
    Resume,
    Next,
    Prev,
    Stop,
    Clear,
    Remove(String),
    Snapshot(oneshot::Sender<PlayState>),
}

/// Cloneable sender side of the session
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

/// Command channel depth; handlers wait for room only when the actor lags
const COMMAND_BUFFER: usize = 64;

/// Spawn the session actor owning `controller`
pub fn spawn(controller: Controller, events: EngineEventReceiver) -> (SessionHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let task = tokio::spawn(run(controller, rx, events));
    (SessionHandle { tx }, task)
}

async fn run(
    mut controller: Controller,
    mut commands: mpsc::Receiver<Command>,
    mut events: EngineEventReceiver,
) {
    info!("Playback session started");
    let mut engine_open = true;

    loop {
        let deadline = controller.deadline();

        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => apply(&mut controller, command),
                None => break,
            },
            event = events.recv(), if engine_open => match event {
                Some(event) => controller.handle_event(event),
                None => {
                    debug!("Engine event channel closed");
                    engine_open = false;
                }
            },
            _ = wait_for(deadline) => controller.on_deadline(Instant::now()),
        }
    }

    controller.stop();
    info!("Playback session ended");
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}

fn apply(controller: &mut Controller, command: Command) {
    debug!("Session command: {:?}", command);
    match command {
        Command::PlayTracks(tracks) => controller.play_tracks(tracks),
        Command::Enqueue(tracks) => controller.enqueue(tracks),
        Command::Start => controller.start(),
        Command::Pause => controller.pause(),
        Command::Resume => controller.resume(),
        Command::Next => controller.next(),
        Command::Prev => controller.prev(),
        Command::Stop => controller.stop(),
        Command::Clear => controller.clear(),
        Command::Remove(track_id) => controller.remove(&track_id),
        Command::Snapshot(reply) => {
            // The requester may have gone away
            let _ = reply.send(controller.snapshot());
        }
    }
}

impl SessionHandle {
    async fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).await.map_err(|_| Error::SessionClosed)
    }

    /// Superseding play: replace the queue and start on its first track
    pub async fn play_tracks(&self, tracks: Vec<Track>) -> Result<()> {
        self.send(Command::PlayTracks(tracks)).await
    }

    /// Append tracks, starting playback if the session is idle
    pub async fn enqueue(&self, tracks: Vec<Track>) -> Result<()> {
        self.send(Command::Enqueue(tracks)).await
    }

    pub async fn start(&self) -> Result<()> {
        self.send(Command::Start).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.send(Command::Resume).await
    }

    pub async fn next(&self) -> Result<()> {
        self.send(Command::Next).await
    }

    pub async fn prev(&self) -> Result<()> {
        self.send(Command::Prev).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.send(Command::Clear).await
    }

    pub async fn remove(&self, track_id: impl Into<String>) -> Result<()> {
        self.send(Command::Remove(track_id.into())).await
    }

    /// Current session snapshot
    pub async fn snapshot(&self) -> Result<PlayState> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await?;
        rx.await.map_err(|_| Error::SessionClosed)
    }
}
