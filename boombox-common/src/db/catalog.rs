//! Catalog queries
//!
//! Read lookups feed the playback commands (play-by-track/album/artist);
//! inserts are used by the release import. Inserts never overwrite an
//! existing document.

use crate::db::models::{Album, Artist, Track};
use crate::Result;
use sqlx::SqlitePool;
use tracing::debug;

/// Default page size for list queries
pub const DEFAULT_LIST_LIMIT: i64 = 50;

const TRACK_COLUMNS: &str =
    "id, title, filename, number, album_id, artist_id, length_seconds";

pub async fn get_track(pool: &SqlitePool, id: &str) -> Result<Option<Track>> {
    let sql = format!("SELECT {} FROM tracks WHERE id = ?", TRACK_COLUMNS);
    let track = sqlx::query_as::<_, Track>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(track)
}

pub async fn get_album(pool: &SqlitePool, id: &str) -> Result<Option<Album>> {
    let album = sqlx::query_as::<_, Album>(
        "SELECT id, artist_id, title, date, track_count FROM albums WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(album)
}

pub async fn get_artist(pool: &SqlitePool, id: &str) -> Result<Option<Artist>> {
    let artist = sqlx::query_as::<_, Artist>("SELECT id, name FROM artists WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(artist)
}

/// Tracks sorted by album then track number
pub async fn list_tracks(pool: &SqlitePool, limit: i64) -> Result<Vec<Track>> {
    let sql = format!(
        "SELECT {} FROM tracks ORDER BY album_id ASC, number ASC LIMIT ?",
        TRACK_COLUMNS
    );
    let tracks = sqlx::query_as::<_, Track>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(tracks)
}

/// Albums sorted a-z by title
pub async fn list_albums(pool: &SqlitePool, limit: i64) -> Result<Vec<Album>> {
    let albums = sqlx::query_as::<_, Album>(
        "SELECT id, artist_id, title, date, track_count FROM albums ORDER BY title ASC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(albums)
}

/// Artists sorted a-z by name
pub async fn list_artists(pool: &SqlitePool, limit: i64) -> Result<Vec<Artist>> {
    let artists =
        sqlx::query_as::<_, Artist>("SELECT id, name FROM artists ORDER BY name ASC LIMIT ?")
            .bind(limit)
            .fetch_all(pool)
            .await?;
    Ok(artists)
}

/// All tracks of an album in play order
pub async fn tracks_by_album(pool: &SqlitePool, album_id: &str) -> Result<Vec<Track>> {
    let sql = format!(
        "SELECT {} FROM tracks WHERE album_id = ? ORDER BY number ASC",
        TRACK_COLUMNS
    );
    let tracks = sqlx::query_as::<_, Track>(&sql)
        .bind(album_id)
        .fetch_all(pool)
        .await?;
    debug!("Album {} has {} tracks", album_id, tracks.len());
    Ok(tracks)
}

/// All tracks of an artist, album by album, in play order
pub async fn tracks_by_artist(pool: &SqlitePool, artist_id: &str) -> Result<Vec<Track>> {
    let sql = format!(
        "SELECT {} FROM tracks WHERE artist_id = ? ORDER BY album_id ASC, number ASC",
        TRACK_COLUMNS
    );
    let tracks = sqlx::query_as::<_, Track>(&sql)
        .bind(artist_id)
        .fetch_all(pool)
        .await?;
    debug!("Artist {} has {} tracks", artist_id, tracks.len());
    Ok(tracks)
}

/// Insert an artist; returns false if the id already existed
pub async fn insert_artist(pool: &SqlitePool, artist: &Artist) -> Result<bool> {
    let result = sqlx::query("INSERT OR IGNORE INTO artists (id, name) VALUES (?, ?)")
        .bind(&artist.id)
        .bind(&artist.name)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Insert an album; returns false if the id already existed
pub async fn insert_album(pool: &SqlitePool, album: &Album) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO albums (id, artist_id, title, date, track_count) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&album.id)
    .bind(&album.artist_id)
    .bind(&album.title)
    .bind(&album.date)
    .bind(album.track_count)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Insert tracks in one transaction; returns how many were new
pub async fn insert_tracks(pool: &SqlitePool, tracks: &[Track]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for track in tracks {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO tracks (
                id, title, filename, number, album_id, artist_id, length_seconds
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&track.id)
        .bind(&track.title)
        .bind(&track.filename)
        .bind(track.number)
        .bind(&track.album_id)
        .bind(&track.artist_id)
        .bind(track.length_seconds)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}
