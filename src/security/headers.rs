//! Header sets owned by the security layer.
//!
//! # Responsibilities
//! - Defensive response headers added to every response
//! - Hop-by-hop and CORS headers stripped from relayed upstream responses

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

pub const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Defensive headers set on every response.
pub fn defensive_headers() -> [(HeaderName, HeaderValue); 5] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (
            PERMISSIONS_POLICY,
            HeaderValue::from_static(
                "camera=(self), geolocation=(self), accelerometer=(self), gyroscope=(self), magnetometer=(self)",
            ),
        ),
    ]
}

/// Headers that describe a single connection and must not be relayed.
const HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
    header::PROXY_AUTHENTICATE,
];

/// Remove hop-by-hop headers and upstream CORS grants from a relayed
/// response so the edge's own CORS stage stays authoritative.
pub fn strip_upstream_headers(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove(header::ACCESS_CONTROL_ALLOW_ORIGIN);
    headers.remove(header::ACCESS_CONTROL_ALLOW_CREDENTIALS);
}
