//! Engine response to wire response conversion.
//!
//! # Responsibilities
//! - Map the engine's status code, reason, headers, and body onto the
//!   HTTP response written back to the caller
//! - Reject records the wire cannot express (bad status, bad header)

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::engine::EngineResponse;

/// Failures converting an engine response into a wire response.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Status code outside the representable range.
    #[error("engine produced invalid status code {0}")]
    InvalidStatus(u16),

    /// Header name or value the wire cannot carry.
    #[error("engine produced invalid header {name:?}")]
    InvalidHeader { name: String },
}

/// Build the wire response for an engine response.
pub fn into_http(engine: EngineResponse) -> Result<Response<Full<Bytes>>, ResponseError> {
    let status =
        StatusCode::from_u16(engine.status).map_err(|_| ResponseError::InvalidStatus(engine.status))?;

    let mut response = Response::new(Full::new(engine.body));
    *response.status_mut() = status;

    for (name, value) in &engine.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ResponseError::InvalidHeader { name: name.clone() })?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| ResponseError::InvalidHeader { name: name.clone() })?;
        response.headers_mut().append(header_name, header_value);
    }

    // A non-default reason phrase rides along as an http1 extension.
    if !engine.reason.is_empty() && Some(engine.reason.as_str()) != status.canonical_reason() {
        if let Ok(reason) = hyper::ext::ReasonPhrase::try_from(Bytes::from(engine.reason)) {
            response.extensions_mut().insert(reason);
        }
    }

    Ok(response)
}
