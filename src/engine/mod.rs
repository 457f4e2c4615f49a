//! Compute-engine boundary.
//!
//! The engine is opaque to the rest of the system: the only connection is
//! the outbound/inbound channel pair created here. Whatever owns the
//! [`EngineEndpoint`] — the built-in echo handler or a real engine — is
//! invisible to the broker, which sees tagged messages and nothing else.
//!
//! # Data Flow
//! ```text
//! broker ──(EngineRequest, CorrelationId)──▶ outbound channel ──▶ engine
//! broker ◀──(EngineResponse, CorrelationId)── inbound channel ◀── engine
//! ```
//!
//! # Design Decisions
//! - FIFO per direction, no ordering guarantee across directions
//! - Message payloads are plain serializable records, so the engine could
//!   sit behind any transport without the broker noticing

pub mod link;
pub mod message;

pub use link::{echo, engine_channel, spawn_engine, EngineEndpoint, EngineLink, TaggedRequest, TaggedResponse};
pub use message::{CorrelationId, EngineRequest, EngineResponse};
