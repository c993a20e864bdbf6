//! Gzip compression stage.
//!
//! # Design Decisions
//! - Only the request decides activation: `Accept-Encoding` must mention
//!   gzip and the path must not end in an already-compressed extension
//! - Range headers are dropped from activated requests, since byte ranges
//!   of the identity body are meaningless once the body is gzipped
//! - Responses that are already encoded, bodiless, or answer HEAD are
//!   passed through untouched

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use crate::compression::{EncoderPool, GzipBody};

/// Extensions whose content is already compressed.
const EXCLUDED_EXTENSIONS: [&str; 12] = [
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".ico", ".woff", ".woff2", ".mp4", ".webm", ".zip", ".gz",
];

pub fn accepts_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains("gzip"))
}

pub fn is_excluded(path: &str) -> bool {
    let path = path.to_ascii_lowercase();
    EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn has_body(method: &Method, status: StatusCode) -> bool {
    *method != Method::HEAD
        && !status.is_informational()
        && status != StatusCode::NO_CONTENT
        && status != StatusCode::NOT_MODIFIED
}

pub async fn compress(State(pool): State<EncoderPool>, mut request: Request, next: Next) -> Response {
    if !accepts_gzip(request.headers()) || is_excluded(request.uri().path()) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    request.headers_mut().remove(header::RANGE);
    request.headers_mut().remove(header::IF_RANGE);

    let response = next.run(request).await;
    if response.headers().contains_key(header::CONTENT_ENCODING) || !has_body(&method, response.status()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    parts
        .headers
        .insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::ACCEPT_RANGES);
    parts
        .headers
        .append(header::VARY, HeaderValue::from_static("Accept-Encoding"));

    Response::from_parts(parts, Body::new(GzipBody::new(body, pool.acquire())))
}
