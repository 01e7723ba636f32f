//! Airtable MCP - an Airtable tool server for LLM agents
//!
//! Serves MCP over stdio (default) or HTTP, selected by `MCP_TRANSPORT`.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airtable_mcp::api::{create_router, AppState};
use airtable_mcp::mcp::serve_stdio;
use airtable_mcp::{spawn_cleanup_task, Config, Transport};

/// Main entry point for the Airtable MCP server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber (stderr; stdout carries the protocol)
/// 2. Load configuration from environment variables
/// 3. Build the API client, cache, and dispatcher
/// 4. Start background expiry sweep task
/// 5. Serve the selected transport
/// 6. Handle graceful shutdown on stdin EOF, SIGINT or SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airtable_mcp=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Airtable MCP server");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: transport={:?}, chunk_size={}, cache_max_age={}s, preview_limit={}, cleanup_interval={}s",
        config.transport,
        config.chunk_size,
        config.cache_max_age,
        config.preview_limit,
        config.cleanup_interval
    );

    let state = AppState::from_config(&config).context("Failed to build API client")?;

    let cleanup_handle = spawn_cleanup_task(state.cache.clone(), config.cleanup_interval);
    info!("Background sweep task started");

    match config.transport {
        Transport::Stdio => run_stdio(state, cleanup_handle).await?,
        Transport::Http => run_http(state, config.server_port, cleanup_handle).await?,
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn run_stdio(state: AppState, cleanup_handle: JoinHandle<()>) -> anyhow::Result<()> {
    tokio::select! {
        result = serve_stdio(state.mcp.clone()) => {
            result.context("stdio transport failed")?;
            info!("stdin closed, shutting down");
        }
        _ = shutdown_signal() => {}
    }

    cleanup_handle.abort();
    warn!("Sweep task aborted");
    Ok(())
}

async fn run_http(state: AppState, port: u16, cleanup_handle: JoinHandle<()>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            cleanup_handle.abort();
            warn!("Sweep task aborted");
        })
        .await
        .context("HTTP server failed")?;
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
