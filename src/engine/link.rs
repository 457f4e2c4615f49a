//! The channel pair connecting the broker to the compute engine.
//!
//! # Responsibilities
//! - Construct the outbound/inbound channel pair
//! - Serve an endpoint with an async handler (the reference harness)
//! - Provide the built-in echo handler wired up by the binary

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::message::{CorrelationId, EngineRequest, EngineResponse};

/// Outbound message: request payload tagged with its correlation id.
pub type TaggedRequest = (EngineRequest, CorrelationId);

/// Inbound message: result payload tagged with the id it answers.
pub type TaggedResponse = (EngineResponse, CorrelationId);

/// Broker-side halves of the engine connection.
pub struct EngineLink {
    /// Requests flow out through here.
    pub request_tx: mpsc::UnboundedSender<TaggedRequest>,
    /// Results flow back in through here.
    pub response_rx: mpsc::UnboundedReceiver<TaggedResponse>,
}

/// Engine-side halves of the connection.
pub struct EngineEndpoint {
    /// Requests arrive here.
    pub request_rx: mpsc::UnboundedReceiver<TaggedRequest>,
    /// Results are sent back through here.
    pub response_tx: mpsc::UnboundedSender<TaggedResponse>,
}

/// Create the channel pair between broker and engine.
///
/// Both directions are unbounded; nothing above this caps the number of
/// in-flight requests.
pub fn engine_channel() -> (EngineLink, EngineEndpoint) {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (response_tx, response_rx) = mpsc::unbounded_channel();
    (
        EngineLink {
            request_tx,
            response_rx,
        },
        EngineEndpoint {
            request_rx,
            response_tx,
        },
    )
}

/// Serve an endpoint with the given handler.
///
/// Every request runs in its own task, so results go back in completion
/// order, not arrival order. The loop exits when the request channel
/// closes.
pub fn spawn_engine<H, Fut>(mut endpoint: EngineEndpoint, handler: H) -> JoinHandle<()>
where
    H: Fn(EngineRequest) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = EngineResponse> + Send + 'static,
{
    tokio::spawn(async move {
        while let Some((request, id)) = endpoint.request_rx.recv().await {
            let handler = handler.clone();
            let response_tx = endpoint.response_tx.clone();
            tokio::spawn(async move {
                let response = handler(request).await;
                // The broker discards results it no longer waits for.
                let _ = response_tx.send((response, id));
            });
        }
        tracing::debug!("request channel closed; engine loop exiting");
    })
}

/// Built-in engine handler: echoes the request body.
///
/// Bodyless requests get a one-line description instead, so the bridge
/// answers plain GETs too.
pub async fn echo(request: EngineRequest) -> EngineResponse {
    match request.body {
        Some(body) => EngineResponse::ok(body),
        None => EngineResponse::ok(format!("{} {}", request.method, request.target)),
    }
}
