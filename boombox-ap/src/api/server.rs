//! HTTP server setup and routing
//!
//! Legacy clients issue every playback command as a GET, so command routes
//! accept both GET and POST.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::playback::SessionHandle;
use axum::{
    routing::{delete, get},
    Router,
};
use boombox_common::events::EventBus;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::handlers;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    /// Playback session commands
    pub session: SessionHandle,
    /// Catalog store
    pub db_pool: SqlitePool,
    /// Push channel
    pub bus: EventBus,
    pub port: u16,
}

/// Build the router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        // Superseding play
        .route("/stream/track/:id", get(handlers::stream_track).post(handlers::stream_track))
        .route("/stream/album/:id", get(handlers::stream_album).post(handlers::stream_album))
        .route("/stream/artist/:id", get(handlers::stream_artist).post(handlers::stream_artist))
        // Playback control
        .route("/stream/play", get(handlers::play).post(handlers::play))
        .route("/stream/pause", get(handlers::pause).post(handlers::pause))
        .route("/stream/resume", get(handlers::resume).post(handlers::resume))
        .route("/stream/next", get(handlers::next).post(handlers::next))
        .route("/stream/prev", get(handlers::prev).post(handlers::prev))
        .route("/stream/stop", get(handlers::stop).post(handlers::stop))
        .route("/stream/clear", get(handlers::clear).post(handlers::clear))
        .route("/stream/state", get(handlers::state))
        // Queue management
        .route("/queue/track/:id", get(handlers::queue_track).post(handlers::queue_track))
        .route("/queue/album/:id", get(handlers::queue_album).post(handlers::queue_album))
        .route("/queue/:track_id", delete(handlers::remove_from_queue))
        // Catalog lookups
        .route("/track", get(handlers::list_tracks))
        .route("/track/:id", get(handlers::get_track))
        .route("/album", get(handlers::list_albums))
        .route("/album/:id", get(handlers::get_album))
        .route("/artist", get(handlers::list_artists))
        .route("/artist/:id", get(handlers::get_artist))
        // SSE event stream
        .route("/events", get(super::sse::event_stream));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Run HTTP API server until a shutdown signal arrives
pub async fn run(config: &Config, ctx: AppContext) -> Result<()> {
    let app = create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
