//! sushida-scores HTTP API server.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use sushida_scores_server::server::{AppState, Config, init_logging, router};

/// sushida-scores HTTP API server.
#[derive(Parser, Debug)]
#[command(name = "sushida-scores-server")]
#[command(about = "HTTP API server for sushida typing scores")]
struct Args {
    /// Path to the configuration file. Defaults apply when it does not exist.
    #[arg(short, long, default_value = "sushida-scores-server.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration first (needed for logging setup)
    let config = if args.config.exists() {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };
    let bind_addr = config.bind_addr();

    init_logging(&config.logging)?;
    if !args.config.exists() {
        tracing::warn!(
            "Config file {} not found, using defaults",
            args.config.display()
        );
    }

    tracing::info!("Opening score store at {}", config.store.path);
    let state = AppState::from_config(&config)?;

    // Load result files written by the extraction tool, once
    state.ingest_on_startup().await;

    let mut app = router(state);

    if let Some(static_path) = &config.server.static_path {
        tracing::info!("Serving static files from: {}", static_path);
        app = app.fallback_service(ServeDir::new(static_path));
    }

    tracing::info!(
        enabled = config.cors.enabled,
        origins = ?config.cors.allow_origins,
        "cross-origin access"
    );
    let app = app
        .layer(config.cors.layer())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "sushida-scores-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix, so in-flight requests can finish.
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "cannot listen for SIGTERM"),
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "cannot listen for Ctrl+C");
            }
        }
        _ = terminate => {}
    }
    tracing::info!("shutting down");
}
