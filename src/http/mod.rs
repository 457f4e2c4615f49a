//! HTTP bridging subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (HTTP/1.1 serving, one bridge per connection)
//!     → body.rs (bounded streaming body read)
//!     → broker dispatch (crate::broker)
//!     → response.rs (engine response → wire response)
//!     → written back to the caller
//! ```

pub mod body;
pub mod response;
pub mod server;

pub use server::{BridgeError, BridgeServer};
