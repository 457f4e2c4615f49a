//! Request and response records exchanged with the compute engine.
//!
//! # Responsibilities
//! - Define the immutable request record handed to the engine
//! - Define the immutable response record handed back to the caller
//! - Define the correlation id that tags both directions

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Tag identifying one outstanding request/response pairing.
///
/// Strictly increasing per broker instance, starting at 0, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub u64);

impl CorrelationId {
    /// Get the raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully-read inbound request, ready for dispatch to the engine.
///
/// Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineRequest {
    /// HTTP method, as received.
    pub method: String,

    /// Header name/value pairs in arrival order. Names are lowercase.
    pub headers: Vec<(String, String)>,

    /// Request target: path plus query.
    pub target: String,

    /// Fully-buffered body, or `None` for bodyless methods.
    pub body: Option<Bytes>,
}

/// The engine's answer to one request. Produced exactly once per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResponse {
    /// Status code to write back.
    pub status: u16,

    /// Status reason phrase.
    pub reason: String,

    /// Header name/value pairs, in write order.
    pub headers: Vec<(String, String)>,

    /// Response body bytes.
    pub body: Bytes,
}

impl EngineResponse {
    /// Plain 200 response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
