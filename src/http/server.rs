//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the API routes and the static fallback
//! - Wrap it in the request-processing pipeline
//! - Serve on a listener until shutdown is signalled
//!
//! # Design Decisions
//! - All shared state lives in `AppState` and is injected, never global
//! - Unknown `/api/*` paths are a 404; every other unknown path belongs to
//!   the SPA and goes to the resolver
//! - The request timeout sits inside the pipeline, so a 408 still carries
//!   the security and CORS headers

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;

use crate::assets::SpaResolver;
use crate::config::{ConfigStore, EdgeSettings};
use crate::http::api;
use crate::http::middleware::Pipeline;
use crate::proxy::OutboundClient;
use crate::security::OriginValidator;

/// Largest request body accepted by the API handlers.
pub const BODY_LIMIT: usize = 32 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ConfigStore>,
    pub assets: Arc<SpaResolver>,
    pub origins: OriginValidator,
    pub outbound: Arc<OutboundClient>,
}

/// HTTP server for the edge.
pub struct EdgeServer {
    router: Router,
    pipeline: Pipeline,
}

impl EdgeServer {
    pub fn new(settings: &EdgeSettings, state: AppState) -> Self {
        Self::with_pipeline(Pipeline::new(settings.pipeline()), state)
    }

    pub fn with_pipeline(pipeline: Pipeline, state: AppState) -> Self {
        let router = build_router(&pipeline, state);
        Self { router, pipeline }
    }

    /// The fully wrapped router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Serve on `listener` until `shutdown` fires, then drain connections.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            stages = ?self.pipeline.stages(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the router and wrap it with `pipeline`.
pub fn build_router(pipeline: &Pipeline, state: AppState) -> Router {
    let router = Router::new()
        .route("/api/health", any(api::health))
        .route(
            "/api/config",
            get(api::get_config)
                .head(api::method_not_allowed)
                .post(api::update_config)
                .fallback(api::method_not_allowed),
        )
        .route("/api/imgbb", post(api::upload_image).fallback(api::method_not_allowed))
        .route("/api/proxy", post(api::proxy).fallback(api::method_not_allowed))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TimeoutLayer::new(pipeline.settings().request_timeout))
        .with_state(state);

    pipeline.wrap(router)
}

async fn fallback(State(state): State<AppState>, request: Request) -> Response {
    if request.uri().path().starts_with("/api/") {
        return api::not_found().await.into_response();
    }
    state.assets.serve(request).await
}
