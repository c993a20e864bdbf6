//! Cache-Control policy stage.
//!
//! Headers are chosen from the request path alone and written after the
//! inner handler runs, replacing anything the handler set.

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
const SHORT: &str = "public, max-age=3600";
const IMAGE: &str = "public, max-age=86400";

/// Cache-Control rules parameterised by the long-lived max-age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    max_age: u64,
}

/// Headers to set for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directives {
    pub cache_control: String,
    /// Also send `Pragma: no-cache` and `Expires: 0`.
    pub legacy_no_cache: bool,
}

impl Directives {
    fn of(cache_control: impl Into<String>) -> Self {
        Self {
            cache_control: cache_control.into(),
            legacy_no_cache: false,
        }
    }
}

impl CachePolicy {
    pub fn new(max_age: u64) -> Self {
        Self { max_age }
    }

    pub fn directives(&self, path: &str) -> Directives {
        if path.starts_with("/api/") {
            return Directives::of(NO_CACHE);
        }

        match extension(path).as_deref() {
            None | Some("html") => Directives {
                cache_control: NO_CACHE.to_owned(),
                legacy_no_cache: true,
            },
            Some("js" | "css") if path.contains("/assets/") => {
                Directives::of(format!("public, max-age={}, immutable", self.max_age))
            }
            Some("js" | "css") => Directives::of(SHORT),
            Some("json") if path == "/config.json" => Directives::of(NO_CACHE),
            Some("json") => Directives::of(SHORT),
            Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "ico") => Directives::of(IMAGE),
            Some("woff" | "woff2" | "ttf" | "eot") => Directives::of(format!("public, max-age={}", self.max_age)),
            Some(_) => Directives::of(SHORT),
        }
    }
}

/// Lowercased extension of the last path segment, if any.
fn extension(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = segment.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

pub async fn apply(State(policy): State<CachePolicy>, request: Request, next: Next) -> Response {
    let directives = policy.directives(request.uri().path());
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    match HeaderValue::from_str(&directives.cache_control) {
        Ok(value) => {
            headers.insert(header::CACHE_CONTROL, value);
        }
        Err(e) => tracing::warn!(error = %e, "unrepresentable Cache-Control value"),
    }
    if directives.legacy_no_cache {
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    }
    response
}
