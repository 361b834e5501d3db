//! ComboLink worker
//!
//! Serves three things behind one listener:
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ routing ──┬──▶ releases  ──▶ 302 / 400 JSON
//!                     (request id,              ├──▶ debug page ──▶ 200 HTML
//!                      trace, limits)           └──▶ debug_reader pipeline ──▶ 200 / 400 JSON
//!                                               (404 unknown path, 405 other methods)
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use combolink_worker::config::{load_config, load_credential, WorkerConfig};
use combolink_worker::lifecycle::{signals, Shutdown};
use combolink_worker::observability::{logging, metrics};
use combolink_worker::HttpServer;

#[derive(Parser)]
#[command(name = "combolink-worker")]
#[command(about = "Draft release redirects and debug code reader", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => WorkerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_filter);
    tracing::info!("combolink-worker v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        releases_url = %config.github.releases_url(),
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.debug_reader.max_body_bytes,
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

    let credential = load_credential(&config.github.token_env);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config, credential)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
