//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Correlation and connection ids flow through all log events
//! - Metric updates are cheap (atomic increments); recording is a no-op
//!   until an exporter is installed

pub mod logging;
pub mod metrics;
