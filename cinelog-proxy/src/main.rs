//! cinelog-proxy - Game catalog search proxy
//!
//! Holds the IGDB client credentials server side, caches the bearer token,
//! and serves `POST /api/igdb` to browser and CLI clients.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cinelog_common::config::CineLogConfig;
use cinelog_proxy::igdb::IgdbClient;
use cinelog_proxy::token::TokenSource;
use cinelog_proxy::AppState;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cinelog-proxy
#[derive(Parser, Debug)]
#[command(name = "cinelog-proxy")]
#[command(about = "Game catalog search proxy for CineLog")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "CINELOG_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides [proxy].host)
    #[arg(long, env = "CINELOG_PROXY_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides [proxy].port)
    #[arg(short, long, env = "CINELOG_PROXY_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = CineLogConfig::load(args.config.as_deref()).context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("cinelog_proxy={},tower_http=debug", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cinelog-proxy");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let igdb = IgdbClient::from_config(&config.igdb).context("Failed to build IGDB client")?;
    match igdb.tokens().source() {
        TokenSource::Static => info!("Using static IGDB access token"),
        TokenSource::ClientCredentials => info!("IGDB tokens minted from client credentials"),
        TokenSource::Unconfigured => {
            warn!("No IGDB credentials configured; searches will fail until they are set")
        }
    }
    let state = AppState::new(igdb);
    let app = cinelog_proxy::build_router(state);

    let host = args.host.unwrap_or(config.proxy.host);
    let port = args.port.unwrap_or(config.proxy.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let name = wait_for_stop_signal().await;
            info!(signal = name, "Draining in-flight searches");
        })
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves with the name of the first stop signal received
///
/// A signal whose handler cannot be installed is logged and never fires; the
/// server then only stops on the other one.
async fn wait_for_stop_signal() -> &'static str {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                warn!("Cannot listen for Ctrl+C: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal as unix_signal, SignalKind};
        match unix_signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    }
}
