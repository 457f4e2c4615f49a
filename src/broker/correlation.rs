//! Request/response correlation across the engine channel pair.
//!
//! # Responsibilities
//! - Assign a unique, monotonic correlation id to every dispatch
//! - Track outstanding requests in the pending table
//! - Route each inbound (result, id) to the caller awaiting that id
//! - Discard results that no longer have a waiting caller
//!
//! # Design Decisions
//! - The pending entry is removed before its handle is signaled, so an id
//!   can never resolve twice
//! - No timeout and no pending cap: an unanswered id waits forever and
//!   keeps its table entry (the pending-depth gauge makes this visible)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::engine::{CorrelationId, EngineLink, EngineRequest, EngineResponse, TaggedResponse};
use crate::observability::metrics;

/// Errors surfaced by [`CorrelationBroker::dispatch`].
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The outbound channel is closed: the engine endpoint is gone.
    #[error("compute engine is no longer reachable")]
    EngineGone,

    /// The broker was torn down while this dispatch was outstanding.
    #[error("broker shut down with request {0} outstanding")]
    BrokerClosed(CorrelationId),
}

/// Pending table: id → single-use resolution handle.
///
/// An id is present iff it has been dispatched and not yet resolved.
type PendingTable = DashMap<u64, oneshot::Sender<EngineResponse>>;

/// Correlates dispatched requests with out-of-order engine results.
///
/// One broker serves every connection; all bridges share the same pending
/// table and the single background listener spawned by [`CorrelationBroker::new`].
pub struct CorrelationBroker {
    outbound: mpsc::UnboundedSender<(EngineRequest, CorrelationId)>,
    pending: Arc<PendingTable>,
    next_id: AtomicU64,
}

impl CorrelationBroker {
    /// Build a broker over the given link and start its inbound listener.
    ///
    /// The listener runs until the inbound channel closes. Entries still
    /// pending at that point stay in the table, so their callers keep
    /// waiting; resolution remains at-most-once either way.
    pub fn new(link: EngineLink) -> Self {
        let pending: Arc<PendingTable> = Arc::new(DashMap::new());
        tokio::spawn(listen(link.response_rx, Arc::clone(&pending)));
        Self {
            outbound: link.request_tx,
            pending,
            next_id: AtomicU64::new(0),
        }
    }

    /// Dispatch a request to the engine and await its matching result.
    ///
    /// The pending entry is inserted before the request is emitted, so a
    /// result can never race past its own registration.
    pub async fn dispatch(&self, request: EngineRequest) -> Result<EngineResponse, BrokerError> {
        let id = CorrelationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (handle, resolution) = oneshot::channel();
        self.pending.insert(id.as_u64(), handle);
        metrics::record_pending_depth(self.pending.len());

        tracing::debug!(correlation_id = %id, "dispatching to engine");

        if self.outbound.send((request, id)).is_err() {
            self.pending.remove(&id.as_u64());
            metrics::record_pending_depth(self.pending.len());
            tracing::warn!(correlation_id = %id, "outbound channel closed; dispatch refused");
            return Err(BrokerError::EngineGone);
        }

        resolution.await.map_err(|_| BrokerError::BrokerClosed(id))
    }

    /// Number of dispatched requests still awaiting a result.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Inbound listener: runs for the broker's lifetime.
async fn listen(mut inbound: mpsc::UnboundedReceiver<TaggedResponse>, pending: Arc<PendingTable>) {
    while let Some((result, id)) = inbound.recv().await {
        // Remove first: once the entry is gone, no second resolution for
        // this id is possible.
        match pending.remove(&id.as_u64()) {
            Some((_, handle)) => {
                if handle.send(result).is_err() {
                    tracing::debug!(correlation_id = %id, "caller gone before its result arrived");
                }
                metrics::record_pending_depth(pending.len());
            }
            None => {
                metrics::record_stale_result();
                tracing::debug!(correlation_id = %id, "no pending entry; result discarded");
            }
        }
    }
    tracing::debug!("inbound channel closed; correlation listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::engine_channel;
    use std::collections::HashSet;
    use std::time::Duration;

    fn request(target: &str) -> EngineRequest {
        EngineRequest {
            method: "POST".to_string(),
            headers: Vec::new(),
            target: target.to_string(),
            body: Some(bytes::Bytes::from(target.to_string())),
        }
    }

    #[tokio::test]
    async fn concurrent_dispatches_get_distinct_ids() {
        let (link, mut endpoint) = engine_channel();
        let broker = Arc::new(CorrelationBroker::new(link));

        let mut callers = Vec::new();
        for i in 0..32 {
            let broker = Arc::clone(&broker);
            callers.push(tokio::spawn(async move {
                broker.dispatch(request(&format!("/{i}"))).await
            }));
        }

        let mut seen = HashSet::new();
        for _ in 0..32 {
            let (req, id) = endpoint.request_rx.recv().await.unwrap();
            assert!(seen.insert(id.as_u64()), "id {id} allocated twice");
            endpoint
                .response_tx
                .send((EngineResponse::ok(req.body.unwrap()), id))
                .unwrap();
        }
        for caller in callers {
            assert!(caller.await.unwrap().is_ok());
        }
    }

    #[tokio::test]
    async fn out_of_order_results_reach_their_own_callers() {
        let (link, mut endpoint) = engine_channel();
        let broker = Arc::new(CorrelationBroker::new(link));

        let dispatch = |target: &str| {
            let broker = Arc::clone(&broker);
            let target = target.to_string();
            tokio::spawn(async move { broker.dispatch(request(&target)).await })
        };

        let caller_a = dispatch("/a");
        let (_, id_a) = endpoint.request_rx.recv().await.unwrap();
        let caller_b = dispatch("/b");
        let (_, id_b) = endpoint.request_rx.recv().await.unwrap();
        let caller_c = dispatch("/c");
        let (_, id_c) = endpoint.request_rx.recv().await.unwrap();

        assert_eq!(id_a, CorrelationId(0));
        assert_eq!(id_b, CorrelationId(1));
        assert_eq!(id_c, CorrelationId(2));

        // Deliver c, a, b.
        endpoint.response_tx.send((EngineResponse::ok("c"), id_c)).unwrap();
        endpoint.response_tx.send((EngineResponse::ok("a"), id_a)).unwrap();
        endpoint.response_tx.send((EngineResponse::ok("b"), id_b)).unwrap();

        assert_eq!(&caller_a.await.unwrap().unwrap().body[..], b"a");
        assert_eq!(&caller_b.await.unwrap().unwrap().body[..], b"b");
        assert_eq!(&caller_c.await.unwrap().unwrap().body[..], b"c");
        assert_eq!(broker.pending_len(), 0);
    }

    #[tokio::test]
    async fn duplicate_and_unknown_results_are_dropped() {
        let (link, mut endpoint) = engine_channel();
        let inject = endpoint.response_tx.clone();
        let broker = Arc::new(CorrelationBroker::new(link));

        // A result for an id that was never dispatched.
        inject.send((EngineResponse::ok("unknown"), CorrelationId(999))).unwrap();

        // A normal dispatch still resolves, exactly once, with its result.
        let caller = {
            let broker = Arc::clone(&broker);
            tokio::spawn(async move { broker.dispatch(request("/live")).await })
        };
        let (_, id) = endpoint.request_rx.recv().await.unwrap();
        inject.send((EngineResponse::ok("first"), id)).unwrap();
        let resolved = caller.await.unwrap().unwrap();
        assert_eq!(&resolved.body[..], b"first");

        // The entry is gone; a second result for the same id is noise.
        inject.send((EngineResponse::ok("second"), id)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(broker.pending_len(), 0);
    }

    #[tokio::test]
    async fn dispatch_fails_cleanly_when_engine_is_gone() {
        let (link, endpoint) = engine_channel();
        let broker = CorrelationBroker::new(link);
        drop(endpoint);

        let err = broker.dispatch(request("/void")).await.unwrap_err();
        assert!(matches!(err, BrokerError::EngineGone));
        assert_eq!(broker.pending_len(), 0);
    }
}
