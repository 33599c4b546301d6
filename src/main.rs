//! Relay Proxy
//!
//! A streaming reverse proxy built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ proxy::handler
//!                                          │
//!                     settings::holder ◀───┤ resolve route
//!                     filter::chain    ◀───┤ request phase
//!                     proxy::mapper    ◀───┤ outbound request
//!                     proxy::transport ◀───┼──────────────────▶ Backend
//!                     filter::chain    ◀───┤ response phase
//!     Client Response                      │
//!     ◀────────────── proxy::writer ◀──────┘ proxy::streamer (flushed pieces)
//!
//!     config file ──▶ config::watcher ──▶ settings::FileSource ──▶ settings::holder
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use relay_proxy::config::load_config;
use relay_proxy::lifecycle::{wait_for_termination, Shutdown};
use relay_proxy::observability::{logging, metrics};
use relay_proxy::{FileSource, HttpServer, HttpTransport, SettingsHolder, SettingsSource};

#[derive(Parser)]
#[command(name = "relay-proxy", version, about = "Streaming HTTP reverse proxy")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "proxy.toml")]
    config: PathBuf,

    /// Load routes once and ignore later edits to the file.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "relay-proxy starting");
    tracing::info!(
        path = ?cli.config,
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        buffer_size = config.streaming.buffer_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let holder = Arc::new(SettingsHolder::new());
    let source = if cli.no_watch {
        FileSource::new(&cli.config).once()
    } else {
        FileSource::new(&cli.config)
    };
    let subscription = source.subscribe(holder.clone())?;
    tracing::info!(watching = subscription.is_live(), "Settings source subscribed");

    let transport = Arc::new(HttpTransport::new(&config.timeouts));
    let server = HttpServer::new(&config, holder, transport);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        let signal = wait_for_termination().await;
        tracing::info!(signal, "Termination requested, draining connections");
        trigger.trigger();
    });

    server.run(listener, server_shutdown).await?;

    drop(subscription);
    tracing::info!("Shutdown complete");
    Ok(())
}
