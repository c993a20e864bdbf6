//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate static dir → Load config record → Build outbound client
//!     → AppState
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown.rs trigger
//!
//! Shutdown (shutdown.rs):
//!     Trigger → server stops accepting → in-flight responses drain → exit
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{prepare, StartupError};
