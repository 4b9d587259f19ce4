//! HTTP request handlers
//!
//! Playback commands answer `{"error": false}` as soon as the session has
//! accepted them; the resulting state arrives on the push channel.
//! Lookup misses answer 404 with `{"error": true, "playing": false, "msg": ...}`.

use crate::api::server::AppContext;
use crate::error::Error;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use boombox_common::db::{self, Album, Artist, Track, DEFAULT_LIST_LIMIT};
use boombox_common::events::PlayState;
use serde::Serialize;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    git_hash: String,
    build_timestamp: String,
    build_profile: String,
    port: u16,
}

/// Command acknowledgment
#[derive(Debug, Serialize)]
pub struct AckResponse {
    error: bool,
}

/// Failure body understood by legacy clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: bool,
    playing: bool,
    msg: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: true,
            playing: false,
            msg: msg.into(),
        }),
    )
}

fn not_found(msg: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, msg)
}

/// Map service errors onto HTTP responses
fn internal(e: impl Into<Error>) -> ApiError {
    match e.into() {
        Error::SessionClosed => {
            error!("Playback session is not running");
            api_error(StatusCode::SERVICE_UNAVAILABLE, "Playback session is not running")
        }
        e => {
            error!("Request failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn ack() -> Json<AckResponse> {
    Json(AckResponse { error: false })
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "boombox-ap".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
        port: ctx.port,
    })
}

// ============================================================================
// Play Endpoints
// ============================================================================

async fn album_tracks(ctx: &AppContext, album_id: &str) -> Result<Vec<Track>, ApiError> {
    if db::get_album(&ctx.db_pool, album_id).await.map_err(internal)?.is_none() {
        return Err(not_found("Album not found."));
    }
    let tracks = db::tracks_by_album(&ctx.db_pool, album_id)
        .await
        .map_err(internal)?;
    if tracks.is_empty() {
        warn!("No tracks found for album: {}", album_id);
        return Err(not_found("No tracks found for album"));
    }
    Ok(tracks)
}

async fn single_track(ctx: &AppContext, track_id: &str) -> Result<Track, ApiError> {
    db::get_track(&ctx.db_pool, track_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Track not found."))
}

/// /stream/track/:id - Play one track, replacing the queue
pub async fn stream_track(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<AckResponse> {
    let track = single_track(&ctx, &id).await?;
    info!("Play track: {}", track.title);
    ctx.session.play_tracks(vec![track]).await.map_err(internal)?;
    Ok(ack())
}

/// /stream/album/:id - Play an album in track order, replacing the queue
pub async fn stream_album(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<AckResponse> {
    let tracks = album_tracks(&ctx, &id).await?;
    info!("Play album {} ({} tracks)", id, tracks.len());
    ctx.session.play_tracks(tracks).await.map_err(internal)?;
    Ok(ack())
}

/// /stream/artist/:id - Play everything by an artist, replacing the queue
pub async fn stream_artist(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<AckResponse> {
    if db::get_artist(&ctx.db_pool, &id).await.map_err(internal)?.is_none() {
        return Err(not_found("Artist not found."));
    }
    let tracks = db::tracks_by_artist(&ctx.db_pool, &id)
        .await
        .map_err(internal)?;
    if tracks.is_empty() {
        warn!("No tracks found for artist: {}", id);
        return Err(not_found("No tracks found for artist"));
    }
    info!("Play artist {} ({} tracks)", id, tracks.len());
    ctx.session.play_tracks(tracks).await.map_err(internal)?;
    Ok(ack())
}

/// /queue/track/:id - Append a track, starting playback if idle
pub async fn queue_track(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<AckResponse> {
    let track = single_track(&ctx, &id).await?;
    ctx.session.enqueue(vec![track]).await.map_err(internal)?;
    Ok(ack())
}

/// /queue/album/:id - Append an album, starting playback if idle
pub async fn queue_album(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<AckResponse> {
    let tracks = album_tracks(&ctx, &id).await?;
    ctx.session.enqueue(tracks).await.map_err(internal)?;
    Ok(ack())
}

/// DELETE /queue/:track_id - Remove the first queued copy of a track
pub async fn remove_from_queue(
    State(ctx): State<AppContext>,
    Path(track_id): Path<String>,
) -> ApiResult<AckResponse> {
    ctx.session.remove(track_id).await.map_err(internal)?;
    Ok(ack())
}

// ============================================================================
// Playback Control Endpoints
// ============================================================================

/// /stream/play - Restart a stopped session
pub async fn play(State(ctx): State<AppContext>) -> ApiResult<AckResponse> {
    ctx.session.start().await.map_err(internal)?;
    Ok(ack())
}

/// /stream/pause
pub async fn pause(State(ctx): State<AppContext>) -> ApiResult<AckResponse> {
    ctx.session.pause().await.map_err(internal)?;
    Ok(ack())
}

/// /stream/resume
pub async fn resume(State(ctx): State<AppContext>) -> ApiResult<AckResponse> {
    ctx.session.resume().await.map_err(internal)?;
    Ok(ack())
}

/// /stream/next
pub async fn next(State(ctx): State<AppContext>) -> ApiResult<AckResponse> {
    ctx.session.next().await.map_err(internal)?;
    Ok(ack())
}

/// /stream/prev
pub async fn prev(State(ctx): State<AppContext>) -> ApiResult<AckResponse> {
    ctx.session.prev().await.map_err(internal)?;
    Ok(ack())
}

/// /stream/stop
pub async fn stop(State(ctx): State<AppContext>) -> ApiResult<AckResponse> {
    ctx.session.stop().await.map_err(internal)?;
    Ok(ack())
}

/// /stream/clear
pub async fn clear(State(ctx): State<AppContext>) -> ApiResult<AckResponse> {
    ctx.session.clear().await.map_err(internal)?;
    Ok(ack())
}

/// GET /stream/state - Current playstate, as last pushed
pub async fn state(State(ctx): State<AppContext>) -> ApiResult<PlayState> {
    let playstate = ctx.session.snapshot().await.map_err(internal)?;
    Ok(Json(playstate))
}

// ============================================================================
// Catalog Endpoints
// ============================================================================

/// GET /track
pub async fn list_tracks(State(ctx): State<AppContext>) -> ApiResult<Vec<Track>> {
    let tracks = db::list_tracks(&ctx.db_pool, DEFAULT_LIST_LIMIT)
        .await
        .map_err(internal)?;
    Ok(Json(tracks))
}

/// GET /track/:id
pub async fn get_track(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Track> {
    single_track(&ctx, &id).await.map(Json)
}

/// GET /album
pub async fn list_albums(State(ctx): State<AppContext>) -> ApiResult<Vec<Album>> {
    let albums = db::list_albums(&ctx.db_pool, DEFAULT_LIST_LIMIT)
        .await
        .map_err(internal)?;
    Ok(Json(albums))
}

/// GET /album/:id
pub async fn get_album(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Album> {
    db::get_album(&ctx.db_pool, &id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("Album not found."))
}

/// GET /artist
pub async fn list_artists(State(ctx): State<AppContext>) -> ApiResult<Vec<Artist>> {
    let artists = db::list_artists(&ctx.db_pool, DEFAULT_LIST_LIMIT)
        .await
        .map_err(internal)?;
    Ok(Json(artists))
}

/// GET /artist/:id
pub async fn get_artist(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Artist> {
    db::get_artist(&ctx.db_pool, &id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("Artist not found."))
}
