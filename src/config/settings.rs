//! Process settings.
//!
//! Every option is a command-line flag with an environment-variable
//! fallback. Boolean toggles take an explicit value (`--gzip false`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use url::Url;

use crate::http::middleware::{CorsPolicy, PipelineSettings};

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// One year, the max-age for content-hashed assets and fonts.
pub const DEFAULT_CACHE_MAX_AGE: u64 = 31_536_000;

/// Seconds a request may take to arrive and be answered.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Settings for the edge server process.
#[derive(Debug, Clone, Parser)]
#[command(name = "spa-edge", version, about = "Static SPA edge server with an allow-listed outbound proxy")]
pub struct EdgeSettings {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Directory holding the built SPA (must contain index.html).
    #[arg(long = "static-dir", visible_alias = "static", env = "STATIC_DIR", default_value = "./public")]
    pub static_dir: PathBuf,

    /// Gzip responses for clients that accept it.
    #[arg(long = "gzip", env = "ENABLE_GZIP", default_value_t = true, action = ArgAction::Set)]
    pub enable_gzip: bool,

    /// Emit Cache-Control headers.
    #[arg(long = "cache", env = "ENABLE_CACHE", default_value_t = true, action = ArgAction::Set)]
    pub enable_cache: bool,

    /// Max-age in seconds for hashed assets and fonts.
    #[arg(long = "cache-max-age", env = "CACHE_MAX_AGE", default_value_t = DEFAULT_CACHE_MAX_AGE)]
    pub cache_max_age: u64,

    /// Log one line per request.
    #[arg(long = "logging", env = "ENABLE_LOGGING", default_value_t = true, action = ArgAction::Set)]
    pub enable_logging: bool,

    /// Origins allowed to receive CORS headers. Empty reflects any origin.
    #[arg(long = "cors-origins", env = "CORS_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Seconds before a slow request is answered with 408.
    #[arg(long = "request-timeout", env = "REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Image upload provider endpoint.
    #[arg(long = "upload-endpoint", env = "UPLOAD_ENDPOINT", default_value = DEFAULT_UPLOAD_ENDPOINT)]
    pub upload_endpoint: Url,

    /// Serve Prometheus metrics on this address.
    #[arg(long = "metrics-address", env = "METRICS_ADDRESS")]
    pub metrics_address: Option<SocketAddr>,
}

impl EdgeSettings {
    /// `host:port` to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn pipeline(&self) -> PipelineSettings {
        PipelineSettings {
            logging: self.enable_logging,
            compression: self.enable_gzip,
            cache_policy: self.enable_cache,
            cache_max_age: self.cache_max_age,
            cors: CorsPolicy::from_origins(self.cors_origins.iter().cloned()),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
