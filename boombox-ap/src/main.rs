//! Boombox Audio Player (boombox-ap) - Main entry point
//!
//! `serve` (the default) runs the playback session and its HTTP API;
//! `import` loads a ripped release into the catalog.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use boombox_ap::api::{self, AppContext};
use boombox_ap::config::{self, Config};
use boombox_ap::playback::{engine, session, Controller, Emitter, Mpg123Engine};
use boombox_common::config::{default_config_path, TomlConfig};
use boombox_common::db;
use boombox_common::events::EventBus;
use boombox_common::release::{collate_release, import_release};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for boombox-ap
#[derive(Parser, Debug)]
#[command(name = "boombox-ap")]
#[command(about = "Audio player for the Boombox media server")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Bootstrap config file
    #[arg(short, long, env = "BOOMBOX_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "BOOMBOX_PORT", global = true)]
    port: Option<u16>,

    /// Directory track filenames are relative to
    #[arg(short, long, env = "BOOMBOX_MEDIA_ROOT", global = true)]
    media_root: Option<PathBuf>,

    /// SQLite catalog database
    #[arg(short, long, env = "BOOMBOX_DATABASE", global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the player and its HTTP API (default)
    Serve,
    /// Import a MusicBrainz release document produced by the disc ripper
    Import {
        /// Release JSON file
        release: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing: RUST_LOG, then the config file, then the default
    let config_path = args.config.clone().or_else(default_config_path);
    let early_config = config_path
        .as_deref()
        .and_then(|p| TomlConfig::from_file(p).ok());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config::log_filter(early_config.as_ref()).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Boombox Audio Player (boombox-ap) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let file_config = TomlConfig::load_or_default(args.config.as_deref());
    let config = Config::resolve(
        &file_config,
        args.port,
        args.media_root.as_deref(),
        args.database.as_deref(),
    );

    match args.command {
        Some(Commands::Import { release }) => import(&config, &release).await,
        Some(Commands::Serve) | None => serve(config).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Media root: {}", config.media_root.display());
    info!("Database: {}", config.database_path.display());

    let db_pool = db::init_database(&config.database_path)
        .await
        .context("Failed to open catalog database")?;

    let bus = EventBus::new(config.event_capacity);

    let (event_tx, event_rx) = engine::event_channel();
    let engine = Mpg123Engine::spawn(&config.engine, event_tx)
        .context("Failed to start audio engine")?;

    let controller = Controller::new(
        config.media_root.clone(),
        Box::new(engine),
        Box::new(Emitter::new(bus.clone())),
        config.engine.command_timeout(),
    );
    let (session, session_task) = session::spawn(controller, event_rx);
    info!("Playback session initialized");

    let ctx = AppContext {
        session,
        db_pool,
        bus,
        port: config.port,
    };

    api::run(&config, ctx).await.context("Server error")?;

    // Last handle went away with the router; the session stops the engine
    session_task.await.context("Playback session panicked")?;
    info!("Shutdown complete");
    Ok(())
}

async fn import(config: &Config, release_path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(release_path)
        .await
        .with_context(|| format!("Failed to read {}", release_path.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", release_path.display()))?;
    let release = collate_release(doc).context("Unrecognized release document")?;

    let pool = db::init_database(&config.database_path)
        .await
        .context("Failed to open catalog database")?;

    let summary = import_release(&pool, &release)
        .await
        .context("Failed to write release to catalog")?;

    info!(
        "Import complete: artist {}, album {}, {} new track(s)",
        if summary.artist_inserted { "added" } else { "existing" },
        if summary.album_inserted { "added" } else { "existing" },
        summary.tracks_inserted
    );
    pool.close().await;
    Ok(())
}
