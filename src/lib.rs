//! SPA edge server library.
//!
//! Serves a single-page application's static build, falls back to its
//! shell document for client-side routes, and exposes a small `/api`
//! surface: health, a persisted runtime config record, an image-upload
//! passthrough and an allow-listed outbound proxy.

// Request path
pub mod assets;
pub mod compression;
pub mod http;
pub mod proxy;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::{AppConfig, ConfigStore, EdgeSettings};
pub use http::{AppState, EdgeServer};
pub use lifecycle::Shutdown;
