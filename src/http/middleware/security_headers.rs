//! Security header stage.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::security::headers::defensive_headers;

/// Set the defensive header set on every response.
pub async fn apply(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in defensive_headers() {
        headers.insert(name, value);
    }
    response
}
