//! Bridge between HTTP callers and an asynchronous compute engine.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                COMPUTE BRIDGE                 │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐   ┌─────────┐   ┌────────────┐  │
//!   ─────────────────┼─▶│   net   │──▶│  http   │──▶│   broker   │  │
//!                    │  │listener │   │ bridge  │   │ (pending   │  │
//!                    │  └─────────┘   └─────────┘   │  table)    │  │
//!                    │                              └─────┬──────┘  │
//!                    │                                    │ (req,id)│
//!                    │                                    ▼         │
//!   Client Response  │  ┌─────────┐   ┌─────────┐   ┌────────────┐  │     Compute
//!   ◀────────────────┼──│response │◀──│ broker  │◀──│  channel   │◀─┼──── Engine
//!                    │  │ writer  │   │ resolve │   │   pair     │  │  (result, id)
//!                    │  └─────────┘   └─────────┘   └────────────┘  │
//!                    │                                               │
//!                    │  cross-cutting: config, observability,        │
//!                    │                 lifecycle                     │
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! Results come back from the engine in completion order, not request
//! order; the broker's pending table is what routes each one to the
//! caller that is waiting for it.

// Core subsystems
pub mod broker;
pub mod engine;
pub mod http;
pub mod net;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use broker::CorrelationBroker;
pub use config::BridgeConfig;
pub use http::BridgeServer;
pub use lifecycle::Shutdown;
