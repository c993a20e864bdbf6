//! Request logging stage.
//!
//! Assigns a request id, times the request and emits one event per
//! response once the body has been fully sent (or abandoned).

use std::time::Instant;

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::http::capture::{capture, CaptureSummary};
use crate::observability::metrics;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub async fn log_requests(mut request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .cloned()
        .or_else(|| HeaderValue::try_from(Uuid::new_v4().to_string()).ok());
    if let Some(id) = &request_id {
        request.headers_mut().insert(X_REQUEST_ID, id.clone());
    }

    let mut response = next.run(request).await;
    if let Some(id) = &request_id {
        response.headers_mut().insert(X_REQUEST_ID, id.clone());
    }

    let request_id = request_id
        .as_ref()
        .and_then(|id| id.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    capture(response, move |summary: CaptureSummary| {
        let elapsed = start.elapsed();
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = summary.status.as_u16(),
            bytes = summary.bytes,
            duration_ms = elapsed.as_secs_f64() * 1_000.0,
            completed = summary.completed,
            "{} {} {}",
            method,
            path,
            summary.status.as_u16()
        );
        metrics::record_request(method.as_str(), summary.status.as_u16(), elapsed);
    })
}
