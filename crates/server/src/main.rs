mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restream_core::{
    load_config, validate_config, DefinitionStore, FfmpegRelay, Relay, SqliteDefinitionStore,
    StreamOrchestrator, StreamService,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("RESTREAMD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("restreamd {} starting", VERSION);
    info!("Database path: {:?}", config.database.path);
    info!("Relay log directory: {:?}", config.relay.log_dir);

    // Log a config fingerprint so deployments are distinguishable in logs
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Config fingerprint: {}", &config_hash[..16]);

    // Create the definition store
    let store: Arc<dyn DefinitionStore> = Arc::new(
        SqliteDefinitionStore::new(&config.database.path)
            .context("Failed to create definition store")?,
    );
    info!("Definition store initialized");

    // Create the relay launcher; a missing ffmpeg is reported at startup but
    // only fails the individual launches that need it.
    let relay = Arc::new(FfmpegRelay::new(config.relay.clone()));
    if let Err(e) = relay.validate().await {
        warn!("Relay validation failed: {}", e);
    } else {
        info!("Relay launcher ready ({})", relay.name());
    }

    // Create the orchestrator and the grouping service
    let orchestrator = Arc::new(StreamOrchestrator::new(
        Arc::clone(&relay),
        config.relay.log_dir.clone(),
    ));
    let service = StreamService::new(Arc::clone(&store), Arc::clone(&orchestrator));

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        Arc::clone(&orchestrator),
        service,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Kill every relay before the process exits; an orphaned ffmpeg would
    // keep pushing to the platform with nobody supervising it.
    info!("Server shutting down...");
    orchestrator.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
