//! Now Playing Bridge
//!
//! Authenticates against the Spotify desktop client's local API, polls its
//! playback status once a second, and republishes the latest snapshot over
//! HTTP (text/HTML) and WebSocket (push fragments).

use nowplaying_bridge::{api, client, config, poller, session, store};

use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nowplaying_bridge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Now Playing Bridge v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = config::load_config()?;
    tracing::info!("Configuration loaded, port: {}", config.port);

    // Bootstrap the session. The only fatal failure in the process: without
    // a session there is nothing to poll.
    tracing::info!("Authenticating against the local API...");
    let authenticator = session::Authenticator::new()?;
    let session = authenticator.authenticate().await?;
    tracing::info!("Session established for {}", session.base_url());

    let web_client = client::WebClient::new(session)?;

    // Single writer (the poller), any number of readers (the handlers).
    let store = store::SnapshotStore::new();

    let cancel = CancellationToken::new();
    let poller_task = tokio::spawn(poller::run(web_client, store.clone(), cancel.clone()));
    tracing::info!("Status poller started");

    // Build routes
    let app = api::router(api::AppState { store })
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Stopping status poller...");
    cancel.cancel();
    let _ = poller_task.await;
    tracing::info!("Shutdown complete");

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
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
