//! PadBand pad service (padband-ap) - Main entry point
//!
//! Headless service binding the pad engine to an HTTP control surface.
//! Button-press recording, deterministic replay, and remote sound triggering
//! live in the library crate; this binary wires configuration, the database
//! and the HTTP server together.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use padband_ap::api;
use padband_ap::engine::PadEngine;
use padband_ap::sounds::{HttpSoundStore, LogSink};

/// Command-line arguments for padband-ap
#[derive(Parser, Debug)]
#[command(name = "padband-ap")]
#[command(about = "Pad service for PadBand")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5750", env = "PADBAND_PORT")]
    port: u16,

    /// Root folder for database and local state
    #[arg(short, long, env = "PADBAND_ROOT_FOLDER")]
    root_folder: Option<String>,

    /// Base URL of the remote sound store
    #[arg(short, long, env = "PADBAND_SOUND_STORE_URL")]
    sound_store_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "padband_ap=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    let root_folder = padband_common::config::resolve_root_folder(
        args.root_folder.as_deref(),
        "PADBAND_ROOT_FOLDER",
    );
    padband_common::config::ensure_root_folder(&root_folder)
        .context("Failed to create root folder")?;

    info!("Starting PadBand pad service on port {}", args.port);
    info!("Root folder: {}", root_folder.display());

    let db_path = padband_common::config::database_path(&root_folder);
    let pool = padband_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let sound_store_url = padband_common::config::resolve_sound_store_url(
        args.sound_store_url.as_deref(),
        "PADBAND_SOUND_STORE_URL",
    )
    .unwrap_or_else(|| {
        warn!("No sound store URL configured, using http://localhost:9000");
        "http://localhost:9000".to_string()
    });
    info!("Sound store: {}", sound_store_url);

    let sounds = Arc::new(
        HttpSoundStore::new(&sound_store_url).context("Invalid sound store URL")?,
    );

    // Initialize pad engine
    let engine = PadEngine::new(pool, sounds, Arc::new(LogSink));
    info!("Pad engine initialized");

    // Build the application router
    let app_state = api::AppState {
        engine: Arc::clone(&engine),
        port: args.port,
    };

    let app = api::create_router(app_state);

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    info!("Starting HTTP server on {}", addr);

    // Create and run the server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    engine.shutdown();
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
