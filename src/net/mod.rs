//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection slots)
//!     → connection.rs (id assignment, drain tracking)
//!     → handed to the HTTP bridge
//! ```
//!
//! # Design Decisions
//! - A semaphore bounds concurrent connections; the accept loop itself
//!   never buffers more than the OS backlog
//! - Each connection is tracked so shutdown can wait for the tail

pub mod connection;
pub mod listener;
