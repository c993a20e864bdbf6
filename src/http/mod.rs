//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, graceful shutdown)
//!     → middleware/ (logging → compression → cache policy
//!                    → security headers → CORS)
//!     → /api/* → api.rs (errors rendered by error.rs)
//!     → else   → assets resolver
//!     → capture.rs (status and byte count once the body is sent)
//! ```

pub mod api;
pub mod capture;
pub mod error;
pub mod middleware;
pub mod server;

pub use error::ApiError;
pub use middleware::{CorsPolicy, Pipeline, PipelineSettings, Stage};
pub use server::{build_router, AppState, EdgeServer, ServerError};
