//! Track queue: ordered tracks plus the play cursor
//!
//! Insertion order is play order and duplicates are allowed. The cursor is
//! `None` until a track has started since the queue was last built or
//! cleared; otherwise it always indexes an element.

use boombox_common::db::Track;
use std::path::{Path, PathBuf};
use tracing::debug;

/// In-memory play queue owned by the session controller
#[derive(Debug, Clone)]
pub struct TrackQueue {
    /// Directory track filenames are relative to
    media_root: PathBuf,
    tracks: Vec<Track>,
    cursor: Option<usize>,
}

impl TrackQueue {
    /// Create an empty queue resolving filenames under `media_root`
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
            tracks: Vec::new(),
            cursor: None,
        }
    }

    /// Append one track (cursor unchanged)
    pub fn enqueue(&mut self, track: Track) {
        debug!("Enqueue {} ({})", track.title, track.id);
        self.tracks.push(track);
    }

    /// Append tracks in order, returning the index of the first new element
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) -> usize {
        let first = self.tracks.len();
        for track in tracks {
            self.enqueue(track);
        }
        first
    }

    /// Remove the first track with `track_id`
    ///
    /// Returns the removed index. Elements before the cursor shift it down so
    /// the current track stays the same; removing the current element resets
    /// the cursor.
    pub fn remove_by_id(&mut self, track_id: &str) -> Option<usize> {
        let index = self.tracks.iter().position(|t| t.id == track_id)?;
        self.tracks.remove(index);

        self.cursor = match self.cursor {
            Some(c) if index < c => Some(c - 1),
            Some(c) if index == c => None,
            other => other,
        };

        debug!("Removed track {} at index {}", track_id, index);
        Some(index)
    }

    /// Remove every track and reset the cursor
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
    }

    /// First index whose resolved path equals `path`
    pub fn locate_by_filename(&self, path: &Path) -> Option<usize> {
        self.tracks
            .iter()
            .position(|t| self.media_root.join(&t.filename) == path)
    }

    /// Resolved media path of the element at `index`
    pub fn resolve(&self, index: usize) -> Option<PathBuf> {
        self.tracks
            .get(index)
            .map(|t| self.media_root.join(&t.filename))
    }

    /// Point the cursor at `index`; out-of-range indexes are rejected
    pub fn set_cursor(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Track at the cursor
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|c| self.tracks.get(c))
    }

    /// Track before the cursor
    pub fn previous(&self) -> Option<&Track> {
        match self.cursor {
            Some(c) if c > 0 => self.tracks.get(c - 1),
            _ => None,
        }
    }

    /// Track after the cursor
    pub fn next(&self) -> Option<&Track> {
        self.cursor.and_then(|c| self.tracks.get(c + 1))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}
