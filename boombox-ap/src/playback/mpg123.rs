//! `mpg123 -R` engine adapter
//!
//! Drives an mpg123 process in remote-control mode. Commands are written to
//! its stdin by a writer task; status lines on its stdout are turned into
//! [`EngineEvent`]s by a reader task:
//!
//! | line     | meaning                      |
//! |----------|------------------------------|
//! | `@S ...` | stream started after `LOAD`  |
//! | `@P 0`   | playback stopped or finished |
//! | `@P 1`   | paused                       |
//! | `@P 2`   | unpaused                     |
//! | `@E msg` | error                        |
//!
//! mpg123 does not echo which file a status line belongs to, so the adapter
//! tracks the active run itself and attributes status lines to it.

use crate::error::{Error, Result};
use crate::playback::engine::{AudioEngine, EngineEvent, EngineEventSender, RunId};
use boombox_common::config::EngineConfig;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// A parsed mpg123 status line
#[derive(Debug, Clone, PartialEq)]
enum Status {
    Started,
    Finished,
    Paused,
    Resumed,
    Error(String),
}

fn parse_status_line(line: &str) -> Option<Status> {
    let line = line.trim_end();
    if let Some(rest) = line.strip_prefix("@E") {
        return Some(Status::Error(rest.trim().to_string()));
    }
    if line.starts_with("@S") {
        return Some(Status::Started);
    }
    match line.strip_prefix("@P")?.trim() {
        // 3 is "end of track" on newer builds, followed by 0
        "0" | "3" => Some(Status::Finished),
        "1" => Some(Status::Paused),
        "2" => Some(Status::Resumed),
        _ => None,
    }
}

#[derive(Debug)]
struct ActiveRun {
    run: RunId,
    path: PathBuf,
    started: bool,
    ended: bool,
}

/// Attributes status lines to runs and guarantees one `TrackEnded` per run
#[derive(Debug, Default)]
struct RunTracker {
    active: Option<ActiveRun>,
}

impl RunTracker {
    /// Open a new run, ending the previous one if it is still open
    fn begin(&mut self, run: RunId, path: &Path) -> Option<EngineEvent> {
        let ended = self.finish();
        self.active = Some(ActiveRun {
            run,
            path: path.to_path_buf(),
            started: false,
            ended: false,
        });
        ended
    }

    /// End the active run (explicit stop or replacement)
    fn finish(&mut self) -> Option<EngineEvent> {
        let active = self.active.as_mut().filter(|a| !a.ended)?;
        active.ended = true;
        Some(EngineEvent::TrackEnded { run: active.run })
    }

    fn on_status(&mut self, status: Status) -> Option<EngineEvent> {
        match status {
            Status::Started => {
                let active = self.active.as_mut().filter(|a| !a.started && !a.ended)?;
                active.started = true;
                Some(EngineEvent::TrackStarted {
                    run: active.run,
                    path: active.path.clone(),
                })
            }
            // A stop left over from the previous stream arrives before the
            // new run's @S and must not end it
            Status::Finished => {
                let active = self.active.as_mut().filter(|a| a.started && !a.ended)?;
                active.ended = true;
                Some(EngineEvent::TrackEnded { run: active.run })
            }
            Status::Paused | Status::Resumed => None,
            Status::Error(detail) => {
                let run = match self.active.as_mut().filter(|a| !a.ended) {
                    Some(active) => {
                        active.ended = true;
                        Some(active.run)
                    }
                    None => None,
                };
                Some(EngineEvent::Error { run, detail })
            }
        }
    }
}

/// `LOAD` line for `path`, or `None` when the path would break the
/// line-based protocol
fn load_command(path: &Path) -> Option<String> {
    let path = path.display().to_string();
    if path.chars().any(char::is_control) {
        return None;
    }
    Some(format!("LOAD {}", path))
}

fn lock(tracker: &Mutex<RunTracker>) -> MutexGuard<'_, RunTracker> {
    // Tracker state stays consistent even if a holder panicked
    tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Audio engine backed by an `mpg123 -R` child process
pub struct Mpg123Engine {
    commands: mpsc::UnboundedSender<String>,
    tracker: Arc<Mutex<RunTracker>>,
    events: EngineEventSender,
}

impl Mpg123Engine {
    /// Start the engine process and its I/O tasks
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: &EngineConfig, events: EngineEventSender) -> Result<Self> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Engine(format!("Failed to start {}: {}", config.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Engine("engine stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Engine("engine stdout unavailable".to_string()))?;

        info!("Started audio engine: {} {}", config.program, config.args.join(" "));

        let tracker = Arc::new(Mutex::new(RunTracker::default()));
        let (commands, mut command_rx) = mpsc::unbounded_channel::<String>();

        // Writer task: one command per line
        let writer_events = events.clone();
        tokio::spawn(async move {
            while let Some(line) = command_rx.recv().await {
                debug!("mpg123 <- {}", line);
                let written = async {
                    stdin.write_all(line.as_bytes()).await?;
                    stdin.write_all(b"\n").await?;
                    stdin.flush().await
                }
                .await;

                if let Err(e) = written {
                    error!("Failed to write to audio engine: {}", e);
                    let _ = writer_events.send(EngineEvent::Error {
                        run: None,
                        detail: format!("audio engine unreachable: {}", e),
                    });
                    break;
                }
            }
            debug!("Audio engine writer stopped");
        });

        // Reader task: status lines until the process goes away
        let reader_tracker = Arc::clone(&tracker);
        let reader_events = events.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let Some(status) = parse_status_line(&line) else {
                            continue;
                        };
                        debug!("mpg123 -> {}", line);
                        if let Some(event) = lock(&reader_tracker).on_status(status) {
                            let _ = reader_events.send(event);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read from audio engine: {}", e);
                        break;
                    }
                }
            }

            let detail = match child.wait().await {
                Ok(status) => format!("audio engine exited ({})", status),
                Err(e) => format!("audio engine lost: {}", e),
            };
            error!("{}", detail);
            let _ = reader_events.send(EngineEvent::Error { run: None, detail });
        });

        Ok(Self {
            commands,
            tracker,
            events,
        })
    }

    fn send(&self, line: String) {
        if self.commands.send(line).is_err() {
            warn!("Audio engine writer is gone, command dropped");
        }
    }
}

impl AudioEngine for Mpg123Engine {
    fn play(&mut self, run: RunId, path: &Path) {
        if let Some(ended) = lock(&self.tracker).begin(run, path) {
            let _ = self.events.send(ended);
        }
        match load_command(path) {
            Some(line) => self.send(line),
            None => {
                warn!("Refusing to load {:?}: control characters in path", path);
                // The previous stream would keep playing under a failed run
                self.send("STOP".to_string());
                let detail = format!("unplayable path {:?}", path);
                if let Some(failed) = lock(&self.tracker).on_status(Status::Error(detail)) {
                    let _ = self.events.send(failed);
                }
            }
        }
    }

    // PAUSE toggles in mpg123; the controller only pauses a playing run and
    // only resumes a paused one
    fn pause(&mut self) {
        self.send("PAUSE".to_string());
    }

    fn resume(&mut self) {
        self.send("PAUSE".to_string());
    }

    fn stop(&mut self) {
        if let Some(ended) = lock(&self.tracker).finish() {
            let _ = self.events.send(ended);
        }
        self.send("STOP".to_string());
    }
}
