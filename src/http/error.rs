//! API error responses.
//!
//! Every error is answered with a plain-text body carrying its display
//! text; JSON is reserved for successful API responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::proxy::ProxyError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Forbidden: Invalid origin")]
    InvalidOrigin,
    #[error("404 page not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidOrigin => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Proxy(e) => e.status(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::InvalidJson(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "API request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "API request rejected");
        }
        (status, self.to_string()).into_response()
    }
}
