//! Alpha front controller server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ dispatch::front ──▶ routing ──▶ security filters
//!                     (axum, ids,      (`?tk=` rewrite)    (exact,     (blacklists,
//!                      timeouts)                            strict,     temp blacklist)
//!                                                           defaulted)        │
//!                                                                             ▼
//!     Client Response                                                   handler or
//!     ◀────────────── http::server ◀────────────────────────────────── token controller
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use alpha_router::config::{load_config, AlphaConfig};
use alpha_router::http::HttpServer;
use alpha_router::lifecycle::{bootstrap, signals, Shutdown};
use alpha_router::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "alpha-router")]
#[command(about = "Front controller with pattern routing, filters and secure URLs", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AlphaConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "alpha-router starting");

    tracing::info!(
        bind_address = %config.app.bind_address,
        url = %config.app.url,
        pretty_urls = config.app.use_pretty_urls,
        filters = ?config.filters.order,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let config = Arc::new(config);
    let app = bootstrap(config.clone())?;

    let listener = TcpListener::bind(&config.app.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::new(&config, &app);
    let receiver = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::forward_signals(&signal_shutdown).await;
    });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
