//! Structured logging.
//!
//! # Design Decisions
//! - `tracing` events with structured fields throughout the crate
//! - Level filter from `RUST_LOG`, falling back to a crate-wide info level
//! - Request lines are emitted by the logging stage, so the filter can
//!   silence them without touching startup output

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "spa_edge=info,tower_http=info";

/// Install the global subscriber. Returns an error if one is already set.
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
