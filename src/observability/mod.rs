//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! logging stage, proxy client, config store, startup:
//!     → logging.rs (tracing events to stdout)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout / log aggregation
//!     → Prometheus scrape (when --metrics-address is set)
//! ```
//!
//! # Design Decisions
//! - One event per request, written when the body finishes
//! - Request ID flows from the logging stage into every request event

pub mod logging;
pub mod metrics;
