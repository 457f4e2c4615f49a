//! Correlation broker subsystem.
//!
//! # Data Flow
//! ```text
//! bridge dispatch(request)
//!     → allocate id, register resolution handle in pending table
//!     → outbound channel (request, id) → compute engine
//!
//! compute engine (result, id) → inbound channel
//!     → listener removes pending entry, signals handle
//!     → bridge future resolves with the result
//! ```
//!
//! # Design Decisions
//! - Results are matched purely by id; arrival order is irrelevant
//! - A result with no pending entry is expected noise, not an error

pub mod correlation;

pub use correlation::{BrokerError, CorrelationBroker};
