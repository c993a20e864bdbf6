//! Request-processing pipeline.
//!
//! # Responsibilities
//! - Own the fixed stage order
//! - Install only the stages the process settings enable
//! - Carry the per-stage settings (cache max-age, CORS policy, encoder pool)
//!
//! # Design Decisions
//! - Each stage is a plain `axum::middleware::from_fn` handler that either
//!   answers the request itself or delegates to `next`
//! - A disabled stage is never installed, so it has no side effects at all
//! - Security headers and CORS are always on
//!
//! # Data Flow
//! ```text
//! request
//!     → logging.rs (request id, timing, capture)
//!     → compression.rs (pooled gzip body)
//!     → cache_policy.rs (Cache-Control by path)
//!     → security_headers.rs (defensive headers)
//!     → cors.rs (preflight short-circuit, origin reflection)
//!     → router
//! ```

pub mod cache_policy;
pub mod compression;
pub mod cors;
pub mod logging;
pub mod security_headers;

use std::time::Duration;

use axum::http::HeaderValue;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;

use crate::compression::EncoderPool;
use crate::config::settings::{DEFAULT_CACHE_MAX_AGE, DEFAULT_REQUEST_TIMEOUT_SECS};

pub use cache_policy::CachePolicy;
pub use logging::X_REQUEST_ID;

/// One interceptor in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Logging,
    Compression,
    CachePolicy,
    SecurityHeaders,
    Cors,
}

impl Stage {
    /// All stages, outermost first.
    pub const ORDER: [Stage; 5] = [
        Stage::Logging,
        Stage::Compression,
        Stage::CachePolicy,
        Stage::SecurityHeaders,
        Stage::Cors,
    ];
}

/// Which origins receive CORS headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Reflect whatever `Origin` the client sent.
    #[default]
    Reflect,
    /// Reflect only the listed origins.
    AllowList(Vec<String>),
}

impl CorsPolicy {
    /// Build a policy from configured origins. Blank entries are ignored and
    /// an empty list means reflect-all.
    pub fn from_origins<I>(origins: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let listed: Vec<String> = origins
            .into_iter()
            .map(|origin| origin.trim().trim_end_matches('/').to_owned())
            .filter(|origin| !origin.is_empty())
            .collect();
        if listed.is_empty() {
            CorsPolicy::Reflect
        } else {
            CorsPolicy::AllowList(listed)
        }
    }

    pub fn permits(&self, origin: &str) -> bool {
        match self {
            CorsPolicy::Reflect => true,
            CorsPolicy::AllowList(listed) => listed.iter().any(|allowed| allowed.eq_ignore_ascii_case(origin)),
        }
    }

    pub fn permits_header(&self, origin: &HeaderValue) -> bool {
        origin.to_str().map(|origin| self.permits(origin)).unwrap_or(false)
    }
}

/// Stage toggles and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub logging: bool,
    pub compression: bool,
    pub cache_policy: bool,
    pub cache_max_age: u64,
    pub cors: CorsPolicy,
    /// Deadline for the router to produce a response, body read included.
    pub request_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            logging: true,
            compression: true,
            cache_policy: true,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            cors: CorsPolicy::Reflect,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Composes the enabled stages around a router.
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: PipelineSettings,
    pool: EncoderPool,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self::with_pool(settings, EncoderPool::default())
    }

    pub fn with_pool(settings: PipelineSettings, pool: EncoderPool) -> Self {
        Self { settings, pool }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn pool(&self) -> &EncoderPool {
        &self.pool
    }

    /// Installed stages, outermost first.
    pub fn stages(&self) -> Vec<Stage> {
        Stage::ORDER
            .into_iter()
            .filter(|stage| match stage {
                Stage::Logging => self.settings.logging,
                Stage::Compression => self.settings.compression,
                Stage::CachePolicy => self.settings.cache_policy,
                Stage::SecurityHeaders | Stage::Cors => true,
            })
            .collect()
    }

    /// Wrap `router` with the installed stages.
    pub fn wrap(&self, router: Router) -> Router {
        // the last layer added runs first, so install innermost first
        self.stages().into_iter().rev().fold(router, |router, stage| match stage {
            Stage::Cors => router.layer(from_fn_with_state(self.settings.cors.clone(), cors::handle)),
            Stage::SecurityHeaders => router.layer(from_fn(security_headers::apply)),
            Stage::CachePolicy => router.layer(from_fn_with_state(
                CachePolicy::new(self.settings.cache_max_age),
                cache_policy::apply,
            )),
            Stage::Compression => router.layer(from_fn_with_state(self.pool.clone(), compression::compress)),
            Stage::Logging => router.layer(from_fn(logging::log_requests)),
        })
    }
}
