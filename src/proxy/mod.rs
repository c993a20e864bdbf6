//! Outbound proxy subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/proxy
//!     → [origin validated by the handler]
//!     → request.rs (ProxyRequest parsed from JSON)
//!     → gate.rs (URL parsed, host allow-listed)
//!     → client.rs (forward with 30 s deadline, relay stripped response)
//!
//! POST /api/imgbb
//!     → [origin validated by the handler]
//!     → gate.rs (upload host allow-listed)
//!     → request.rs (UploadRequest parsed from JSON)
//!     → client.rs (multipart post with 60 s deadline, relay as JSON)
//! ```
//!
//! # Design Decisions
//! - No retries; upstream failures become 502 with the error text
//! - Upstream error statuses are relayed unchanged

pub mod client;
pub mod gate;
pub mod request;

use axum::http::StatusCode;
use thiserror::Error;

pub use client::{OutboundClient, OutboundTimeouts};
pub use request::{ProxyRequest, UploadRequest};

/// Outbound request failures. The display text is the response body.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Forbidden: Host not in whitelist")]
    HostNotAllowed,
    #[error("Forbidden: ImgBB not in whitelist")]
    UploadHostNotAllowed,
    #[error("API key required")]
    MissingApiKey,
    #[error("Invalid method: {0}")]
    InvalidMethod(String),
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("Proxy request failed: {0}")]
    Forward(#[source] reqwest::Error),
    #[error("ImgBB request failed: {0}")]
    Upload(#[source] reqwest::Error),
    #[error("Failed to build outbound client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidUrl
            | ProxyError::MissingApiKey
            | ProxyError::InvalidMethod(_)
            | ProxyError::InvalidHeader(_) => StatusCode::BAD_REQUEST,
            ProxyError::HostNotAllowed | ProxyError::UploadHostNotAllowed => StatusCode::FORBIDDEN,
            ProxyError::Forward(_) | ProxyError::Upload(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
