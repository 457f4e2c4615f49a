//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     ctrl-c → trigger shutdown
//!
//! Shutdown (shutdown.rs):
//!     signal broadcast → accept loop stops → connections drain → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
