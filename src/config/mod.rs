//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! flags / environment
//!     → settings.rs (EdgeSettings, parsed once at startup)
//!
//! <static-dir>/config.json
//!     → loader.rs (read & deserialize, or fall back to starter record)
//!     → store.rs (ConfigStore, shared via Arc to all handlers)
//!     → POST /api/config → partial update → loader.rs (rewrite file)
//! ```
//!
//! # Design Decisions
//! - Process settings are immutable once parsed
//! - The runtime record is the only mutable shared state
//! - Missing keys in the file take zero values

pub mod loader;
pub mod schema;
pub mod settings;
pub mod store;

pub use loader::ConfigError;
pub use schema::AppConfig;
pub use settings::EdgeSettings;
pub use store::ConfigStore;
