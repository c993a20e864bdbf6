//! `/api/*` handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::AppConfig;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::proxy::{gate, ProxyRequest, UploadRequest};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: bool,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        backend: true,
    })
}

pub async fn get_config(State(state): State<AppState>) -> Json<AppConfig> {
    Json(state.config.get().await)
}

/// Apply a partial update. Unknown and mistyped fields are ignored.
pub async fn update_config(State(state): State<AppState>, body: Bytes) -> Result<Json<AppConfig>, ApiError> {
    let updates: Map<String, Value> = serde_json::from_slice(&body)?;
    let updated = state.config.update(&updates).await;
    tracing::info!(fields = updates.len(), "Config updated");
    Ok(Json(updated))
}

/// Relay an image upload to the upload provider.
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<Response, ApiError> {
    if !state.origins.validate(&headers, &uri) {
        return Err(ApiError::InvalidOrigin);
    }
    gate::admit_upload(&state.config, state.outbound.upload_endpoint()).await?;

    let request: UploadRequest = serde_json::from_slice(&body)?;
    Ok(state.outbound.upload(&request).await?)
}

/// Forward a request to an allow-listed host.
pub async fn proxy(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<Response, ApiError> {
    if !state.origins.validate(&headers, &uri) {
        return Err(ApiError::InvalidOrigin);
    }

    let request: ProxyRequest = serde_json::from_slice(&body)?;
    let target = gate::admit(&state.config, &request.url).await?;
    Ok(state.outbound.forward(&request, target).await?)
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
