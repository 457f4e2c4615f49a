//! compute-bridge binary: wires the listener, broker, and the built-in
//! engine together and serves until ctrl-c.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use compute_bridge::broker::CorrelationBroker;
use compute_bridge::config::{loader, BridgeConfig};
use compute_bridge::engine;
use compute_bridge::http::BridgeServer;
use compute_bridge::lifecycle::{signals, Shutdown};
use compute_bridge::net::listener::Listener;
use compute_bridge::observability::{logging, metrics};

/// HTTP front end for an asynchronous compute engine.
#[derive(Parser)]
#[command(name = "compute-bridge", version)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the configured bind port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => loader::load_config(path)?,
        None => BridgeConfig::default(),
    };
    if cli.host.is_some() || cli.port.is_some() {
        let (host, port) = split_bind_address(&config.listener.bind_address);
        config.listener.bind_address = format!(
            "{}:{}",
            cli.host.as_deref().unwrap_or(&host),
            cli.port.unwrap_or(port)
        );
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        max_body_bytes = config.limits.max_body_bytes,
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

    // The engine side of the channel pair: the built-in echo handler.
    let (link, endpoint) = engine::engine_channel();
    engine::spawn_engine(endpoint, engine::echo);

    let broker = Arc::new(CorrelationBroker::new(link));
    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_ctrl_c(shutdown.clone()));

    let server = BridgeServer::new(config, broker);
    server.run(listener, shutdown.subscribe()).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Split a host:port string; missing or unparsable ports fall back to the
/// default listening port.
fn split_bind_address(addr: &str) -> (String, u16) {
    match addr.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.parse().unwrap_or(25555)),
        None => (addr.to_string(), 25555),
    }
}
