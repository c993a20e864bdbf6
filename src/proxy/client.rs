//! Outbound HTTP client.
//!
//! # Responsibilities
//! - Forward admitted proxy requests and relay the upstream response
//! - Post image uploads as multipart forms to the upload provider
//!
//! # Design Decisions
//! - One shared `reqwest::Client`; timeouts are set per call
//! - Redirects are not followed, so a listed host cannot bounce a request
//!   to an unlisted one
//! - Upstream bodies are streamed, never buffered

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use reqwest::redirect;
use url::Url;

use crate::observability::metrics;
use crate::proxy::request::{ProxyRequest, UploadRequest};
use crate::proxy::ProxyError;
use crate::security::headers::strip_upstream_headers;

/// Per-call deadlines for outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundTimeouts {
    pub upload: Duration,
    pub proxy: Duration,
}

impl Default for OutboundTimeouts {
    fn default() -> Self {
        Self {
            upload: Duration::from_secs(60),
            proxy: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutboundClient {
    http: reqwest::Client,
    upload_endpoint: Url,
    timeouts: OutboundTimeouts,
}

impl OutboundClient {
    pub fn new(upload_endpoint: Url, timeouts: OutboundTimeouts) -> Result<Self, ProxyError> {
        let http = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProxyError::Client)?;
        Ok(Self {
            http,
            upload_endpoint,
            timeouts,
        })
    }

    pub fn upload_endpoint(&self) -> &Url {
        &self.upload_endpoint
    }

    pub fn timeouts(&self) -> OutboundTimeouts {
        self.timeouts
    }

    /// Send `request` to the already-admitted `target`.
    pub async fn forward(&self, request: &ProxyRequest, target: Url) -> Result<Response, ProxyError> {
        let method = request.method()?;
        let headers = request.header_map()?;

        let start = Instant::now();
        let host = target.host_str().unwrap_or_default().to_owned();
        let mut outbound = self
            .http
            .request(method.clone(), target)
            .headers(headers)
            .timeout(self.timeouts.proxy);
        if !request.body.is_empty() {
            outbound = outbound.body(request.body.clone());
        }

        let upstream = match outbound.send().await {
            Ok(upstream) => upstream,
            Err(e) => {
                tracing::error!(host = %host, method = %method, error = %e, "Proxy request failed");
                metrics::record_upstream("proxy", None, start);
                return Err(ProxyError::Forward(e));
            }
        };

        let status = upstream.status();
        tracing::debug!(host = %host, method = %method, status = status.as_u16(), "Proxy response");
        metrics::record_upstream("proxy", Some(status.as_u16()), start);

        let mut headers = upstream.headers().clone();
        strip_upstream_headers(&mut headers);

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    /// Post `request` to the upload provider and relay its JSON answer.
    pub async fn upload(&self, request: &UploadRequest) -> Result<Response, ProxyError> {
        if request.api_key.is_empty() {
            return Err(ProxyError::MissingApiKey);
        }

        let mut url = self.upload_endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", &request.api_key);
            if let Some(expiration) = request.expiration() {
                query.append_pair("expiration", &expiration.to_string());
            }
        }

        let form = reqwest::multipart::Form::new().text("image", request.image.clone());

        let start = Instant::now();
        let upstream = match self
            .http
            .post(url)
            .multipart(form)
            .timeout(self.timeouts.upload)
            .send()
            .await
        {
            Ok(upstream) => upstream,
            Err(e) => {
                // the key travels in the query string, so drop the URL
                let e = e.without_url();
                tracing::error!(error = %e, "Upload request failed");
                metrics::record_upstream("upload", None, start);
                return Err(ProxyError::Upload(e));
            }
        };

        let status = upstream.status();
        tracing::info!(status = status.as_u16(), "Upload relayed");
        metrics::record_upstream("upload", Some(status.as_u16()), start);

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(response)
    }
}
