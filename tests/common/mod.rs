//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use compute_bridge::broker::CorrelationBroker;
use compute_bridge::config::BridgeConfig;
use compute_bridge::engine::{self, EngineRequest, EngineResponse};
use compute_bridge::http::BridgeServer;
use compute_bridge::lifecycle::Shutdown;
use compute_bridge::net::listener::Listener;

/// Spawn a full bridge (listener + broker + engine) on an ephemeral port
/// with the given engine handler.
///
/// Returns the bound address and the shutdown handle that keeps the
/// server alive for the duration of the test.
pub async fn spawn_bridge<H, Fut>(handler: H) -> (SocketAddr, Shutdown)
where
    H: Fn(EngineRequest) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = EngineResponse> + Send + 'static,
{
    let mut config = BridgeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();

    let (link, endpoint) = engine::engine_channel();
    engine::spawn_engine(endpoint, handler);

    let broker = Arc::new(CorrelationBroker::new(link));
    let listener = Listener::bind(&config.listener).await.expect("bind listener");
    let addr = listener.local_addr();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let server = BridgeServer::new(config, broker);
    tokio::spawn(async move {
        server.run(listener, signal).await;
    });

    // Give the accept loop a beat to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, shutdown)
}

/// Plain echo handler used by most scenarios.
pub async fn echo_engine(request: EngineRequest) -> EngineResponse {
    engine::echo(request).await
}

/// HTTP client that ignores any ambient proxy configuration.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build test client")
}
