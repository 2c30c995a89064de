use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::Notify;
use tracing::{info, warn};

use skillrelay_core::{DirectiveRelay, DynForwarder};
use skillrelay_http::HttpForwarder;
use skillrelay_server::api::{AppState, router};
use skillrelay_server::config::RelayServerConfig;
use skillrelay_server::error::ServerError;

/// skillrelay HTTP server.
#[derive(Parser, Debug)]
#[command(
    name = "skillrelay-server",
    about = "Relays smart-home directives to a downstream endpoint"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "skillrelay.toml")]
    config: PathBuf,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let cli = Cli::parse();

    skillrelay_server::telemetry::init();

    let mut config = RelayServerConfig::load(&cli.config)?;
    if !cli.config.exists() {
        info!(path = %cli.config.display(), "config file not found, using defaults");
    }
    config.apply_env();

    let forwarder: Arc<dyn DynForwarder> =
        Arc::new(HttpForwarder::new(config.relay.forwarder_config())?);
    let relay = DirectiveRelay::new(config.relay.relay_config(), forwarder);
    info!(
        base_url = %config.relay.base_url,
        path = %config.relay.path,
        strategy = %config.relay.strategy,
        timeout_secs = ?config.relay.timeout_seconds,
        "relay configured"
    );

    let app = router(AppState {
        relay: Arc::new(relay),
    });

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "skillrelay-server listening");

    let shutdown = Arc::new(Notify::new());
    let serve = axum::serve(listener, app).with_graceful_shutdown({
        let shutdown = Arc::clone(&shutdown);
        async move { shutdown.notified().await }
    });
    let mut serve = tokio::spawn(async move { serve.await });

    tokio::select! {
        result = &mut serve => {
            result.map_err(std::io::Error::other)??;
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    // Drain in-flight directives, bounded by the configured timeout.
    shutdown.notify_one();
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    match tokio::time::timeout(shutdown_timeout, serve).await {
        Ok(result) => result.map_err(std::io::Error::other)??,
        Err(_) => warn!(
            timeout_secs = config.server.shutdown_timeout_seconds,
            "shutdown timeout exceeded, in-flight directives dropped"
        ),
    }

    info!("skillrelay-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
