//! Release import
//!
//! The disc ripper looks the disc up on MusicBrainz and writes the release
//! document as JSON next to the ripped files. This module collates that
//! document into one [`Artist`], one [`Album`] and the album's [`Track`]s,
//! with filenames matching where the ripper stores its output:
//!
//! ```text
//! audio/mp3/<clean artist>/<clean album>/trackNN.cdda.mp3
//! ```

use crate::db::{self, Album, Artist, Track};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::info;

/// Collated catalog records for one release
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRelease {
    pub artist: Artist,
    pub album: Album,
    pub tracks: Vec<Track>,
}

/// Outcome of writing a release to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub artist_inserted: bool,
    pub album_inserted: bool,
    pub tracks_inserted: u64,
}

#[derive(Debug, Deserialize)]
struct MbRelease {
    id: String,
    title: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(rename = "artist-credit")]
    artist_credit: Vec<MbArtistCredit>,
    #[serde(rename = "medium-list")]
    medium_list: Vec<MbMedium>,
}

#[derive(Debug, Deserialize)]
struct MbArtistCredit {
    artist: MbArtist,
}

#[derive(Debug, Deserialize)]
struct MbArtist {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MbMedium {
    #[serde(rename = "track-count", default)]
    track_count: Option<Value>,
    #[serde(rename = "track-list")]
    track_list: Vec<MbTrack>,
}

#[derive(Debug, Deserialize)]
struct MbTrack {
    id: String,
    number: Value,
    /// Milliseconds, as string or number
    #[serde(default)]
    length: Option<Value>,
    recording: MbRecording,
}

#[derive(Debug, Deserialize)]
struct MbRecording {
    title: String,
    #[serde(default)]
    length: Option<Value>,
}

/// MusicBrainz serializes most numbers as strings
fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Replace every character outside `[-a-zA-Z0-9]` with a dash and collapse
/// runs of dashes
pub fn clean_path_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Directory (relative to the media root) holding one release's files
pub fn release_directory(artist: &str, album: &str) -> String {
    format!(
        "audio/mp3/{}/{}/",
        clean_path_component(artist),
        clean_path_component(album)
    )
}

/// Filename the ripper gives track `number`
pub fn track_filename(number: i64) -> String {
    format!("track{:02}.cdda.mp3", number)
}

/// Accepts either a bare release object or the disc lookup document
/// (`{"disc": {"release-list": [release, ...]}}`), taking the first release.
fn extract_release(doc: Value) -> Result<MbRelease> {
    let release = match doc.pointer("/disc/release-list/0") {
        Some(release) => release.clone(),
        None => doc,
    };
    Ok(serde_json::from_value(release)?)
}

/// Collate a MusicBrainz release document into catalog records
pub fn collate_release(doc: Value) -> Result<CatalogRelease> {
    let release = extract_release(doc)?;

    let credit = release
        .artist_credit
        .into_iter()
        .next()
        .ok_or_else(|| Error::InvalidInput("release has no artist credit".to_string()))?;
    let medium = release
        .medium_list
        .into_iter()
        .next()
        .ok_or_else(|| Error::InvalidInput("release has no medium".to_string()))?;

    let artist = Artist {
        id: credit.artist.id,
        name: credit.artist.name,
    };

    let track_count = medium
        .track_count
        .as_ref()
        .and_then(lenient_i64)
        .unwrap_or(medium.track_list.len() as i64);

    let album = Album {
        id: release.id,
        artist_id: artist.id.clone(),
        title: release.title,
        date: release.date,
        track_count,
    };

    let dir = release_directory(&artist.name, &album.title);
    let mut tracks = Vec::with_capacity(medium.track_list.len());
    for mb_track in medium.track_list {
        let number = lenient_i64(&mb_track.number).ok_or_else(|| {
            Error::InvalidInput(format!("track {} has no usable number", mb_track.id))
        })?;
        let length_ms = mb_track
            .length
            .as_ref()
            .or(mb_track.recording.length.as_ref())
            .and_then(lenient_i64)
            .unwrap_or(0);

        tracks.push(Track {
            id: mb_track.id,
            title: mb_track.recording.title,
            filename: format!("{}{}", dir, track_filename(number)),
            number,
            album_id: album.id.clone(),
            artist_id: artist.id.clone(),
            length_seconds: length_ms as f64 / 1000.0,
        });
    }

    Ok(CatalogRelease {
        artist,
        album,
        tracks,
    })
}

/// Write a collated release to the catalog
///
/// Existing documents are left untouched.
pub async fn import_release(pool: &SqlitePool, release: &CatalogRelease) -> Result<ImportSummary> {
    let artist_inserted = db::insert_artist(pool, &release.artist).await?;
    let album_inserted = db::insert_album(pool, &release.album).await?;
    let tracks_inserted = db::insert_tracks(pool, &release.tracks).await?;

    info!(
        "Imported '{}' by {}: {} of {} tracks new",
        release.album.title,
        release.artist.name,
        tracks_inserted,
        release.tracks.len()
    );

    Ok(ImportSummary {
        artist_inserted,
        album_inserted,
        tracks_inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_release() -> Value {
        json!({
            "id": "rel-1",
            "title": "Blue Train (Remastered)",
            "date": "1957",
            "artist-credit": [{"artist": {"id": "art-1", "name": "John Coltrane"}}],
            "medium-list": [{
                "track-count": "2",
                "track-list": [
                    {"id": "trk-1", "number": "1", "length": "643000",
                     "recording": {"id": "rec-1", "title": "Blue Train"}},
                    {"id": "trk-2", "number": 2,
                     "recording": {"id": "rec-2", "title": "Moment's Notice", "length": 550000}}
                ]
            }]
        })
    }

    #[test]
    fn test_clean_path_component() {
        assert_eq!(clean_path_component("John Coltrane"), "John-Coltrane");
        assert_eq!(clean_path_component("Blue Train (Remastered)"), "Blue-Train-Remastered-");
        assert_eq!(clean_path_component("AC/DC"), "AC-DC");
        assert_eq!(clean_path_component("a -- b"), "a-b");
    }

    #[test]
    fn test_track_filename_is_zero_padded() {
        assert_eq!(track_filename(3), "track03.cdda.mp3");
        assert_eq!(track_filename(12), "track12.cdda.mp3");
    }

    #[test]
    fn test_collate_release() {
        let release = collate_release(sample_release()).unwrap();

        assert_eq!(release.artist.id, "art-1");
        assert_eq!(release.album.artist_id, "art-1");
        assert_eq!(release.album.track_count, 2);
        assert_eq!(release.album.date.as_deref(), Some("1957"));
        assert_eq!(release.tracks.len(), 2);

        let first = &release.tracks[0];
        assert_eq!(first.title, "Blue Train");
        assert_eq!(
            first.filename,
            "audio/mp3/John-Coltrane/Blue-Train-Remastered-/track01.cdda.mp3"
        );
        assert_eq!(first.album_id, "rel-1");
        assert_eq!(first.length_seconds, 643.0);

        // Falls back to the recording length
        assert_eq!(release.tracks[1].length_seconds, 550.0);
        assert_eq!(release.tracks[1].number, 2);
    }

    #[test]
    fn test_collate_disc_lookup_document() {
        let doc = json!({"disc": {"release-list": [sample_release()]}});
        let release = collate_release(doc).unwrap();
        assert_eq!(release.album.id, "rel-1");
    }

    #[test]
    fn test_collate_rejects_release_without_artist() {
        let mut doc = sample_release();
        doc["artist-credit"] = json!([]);
        assert!(matches!(collate_release(doc), Err(Error::InvalidInput(_))));
    }
}
