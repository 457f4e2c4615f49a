//! Bridge server: one bridge per connection.
//!
//! # Responsibilities
//! - Accept TCP connections through the bounded listener
//! - Serve HTTP/1.1 on each connection
//! - Bridge each request: read the body, build the request record,
//!   dispatch through the broker, write the engine's response
//! - Abort the connection with no response when the bridge fails
//!   (oversized body, unreachable engine)
//! - Drain active connections on shutdown
//!
//! # Design Decisions
//! - Serving sits directly on hyper's connection API: a service error at
//!   this layer closes the connection without emitting a response, which
//!   is the required behavior for an oversized body
//! - Every connection shares one broker and its single pending table

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::broker::{BrokerError, CorrelationBroker};
use crate::config::BridgeConfig;
use crate::engine::EngineRequest;
use crate::http::body::{read_body, BodyError};
use crate::http::response::{into_http, ResponseError};
use crate::net::connection::ConnectionTracker;
use crate::net::listener::Listener;
use crate::observability::metrics;

/// How long shutdown waits for in-flight connections.
const DRAIN_DEADLINE: Duration = Duration::from_secs(5);

/// Failures that abort a single request's bridge.
///
/// Returned as the hyper service error: the transport closes the
/// connection and the caller never sees a response.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Body(#[from] BodyError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// HTTP front end for the correlation broker.
pub struct BridgeServer {
    config: BridgeConfig,
    broker: Arc<CorrelationBroker>,
    tracker: ConnectionTracker,
}

impl BridgeServer {
    /// Create a server bridging connections into the given broker.
    pub fn new(config: BridgeConfig, broker: Arc<CorrelationBroker>) -> Self {
        Self {
            config,
            broker,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Accept connections until the shutdown signal fires, then wait
    /// (bounded) for in-flight connections to drain.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(address = %listener.local_addr(), "Bridge server accepting connections");

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                accepted = listener.accept() => {
                    let (stream, peer_addr, permit) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            continue;
                        }
                    };

                    let guard = self.tracker.track();
                    let broker = Arc::clone(&self.broker);
                    let ceiling = self.config.limits.max_body_bytes;

                    tokio::spawn(async move {
                        let connection_id = guard.id();
                        tracing::debug!(
                            connection_id = %connection_id,
                            peer_addr = %peer_addr,
                            "Connection opened"
                        );

                        let service = service_fn(move |request| {
                            bridge_request(Arc::clone(&broker), ceiling, request)
                        });
                        if let Err(e) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            // Covers transport failures and aborted bridges
                            // alike: the connection is gone, no response
                            // was produced.
                            tracing::debug!(
                                connection_id = %connection_id,
                                error = %e,
                                "Connection closed with error"
                            );
                        }
                        drop(permit);
                    });
                }
            }
        }

        tracing::info!(active = self.tracker.active_count(), "Shutdown signaled; draining connections");
        if tokio::time::timeout(DRAIN_DEADLINE, self.tracker.wait_for_drain())
            .await
            .is_err()
        {
            tracing::warn!(
                active = self.tracker.active_count(),
                "Drain deadline passed; abandoning remaining connections"
            );
        }
    }
}

/// Bridge one request: body → record → dispatch → response.
async fn bridge_request(
    broker: Arc<CorrelationBroker>,
    ceiling: usize,
    request: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, BridgeError> {
    let start = Instant::now();
    let (parts, body) = request.into_parts();

    let body = read_body(&parts.method, body, ceiling).await?;
    let record = engine_request(&parts, body);
    let method = record.method.clone();

    let engine_response = broker.dispatch(record).await?;
    let status = engine_response.status;
    let wire = into_http(engine_response)?;

    metrics::record_request(&method, status, start);
    Ok(wire)
}

/// Assemble the immutable request record for the engine.
fn engine_request(parts: &hyper::http::request::Parts, body: Option<Bytes>) -> EngineRequest {
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                // HeaderName renders lowercase already.
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    EngineRequest {
        method: parts.method.as_str().to_string(),
        headers,
        target,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_record_captures_target_and_lowercased_headers() {
        let request = hyper::Request::builder()
            .method(hyper::Method::POST)
            .uri("http://ignored.example/echo?q=1")
            .header("X-Custom", "Value")
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();

        let record = engine_request(&parts, Some(Bytes::from_static(b"hi")));
        assert_eq!(record.method, "POST");
        assert_eq!(record.target, "/echo?q=1");
        assert!(record.headers.iter().any(|(n, v)| n == "x-custom" && v == "Value"));
        assert_eq!(record.body.as_deref(), Some(&b"hi"[..]));
    }

    #[test]
    fn bare_path_requests_keep_their_target() {
        let request = hyper::Request::builder().uri("/").body(()).unwrap();
        let (parts, _) = request.into_parts();
        assert_eq!(engine_request(&parts, None).target, "/");
    }
}
