//! Static file and SPA shell resolution.
//!
//! # Responsibilities
//! - Map a request path to a file under the static root, or to the shell
//! - Reject anything that would leave the static root
//! - Serve the chosen file with conditional and range support
//!
//! # Design Decisions
//! - The containment check is lexical and runs before any filesystem call
//! - The first filesystem call resolves symlinks; the result is checked
//!   against the canonical root again before anything is read
//! - Missing files fall back to the shell so the client router owns them

use std::io;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::assets::path::{clean, decode, is_contained};

pub const SHELL_FILE: &str = "index.html";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("path escapes the static root")]
    Forbidden,
    #[error("failed to resolve {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Shell,
    File(PathBuf),
}

/// Resolves and serves files below one static root.
#[derive(Debug, Clone)]
pub struct SpaResolver {
    root: PathBuf,
    shell: PathBuf,
}

impl SpaResolver {
    /// Create a resolver for `root`, which must exist.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        let shell = root.join(SHELL_FILE);
        Ok(Self { root, shell })
    }

    /// Canonical static root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }

    /// Resolve a raw (still percent-encoded) request path.
    pub async fn resolve(&self, request_path: &str) -> Result<Resolution, ResolveError> {
        let relative = clean(&decode(request_path));
        if relative.as_os_str().is_empty() {
            return Ok(Resolution::Shell);
        }
        if !is_contained(&relative) {
            return Err(ResolveError::Forbidden);
        }

        let joined = self.root.join(&relative);
        let resolved = match tokio::fs::canonicalize(&joined).await {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Resolution::Shell),
            Err(source) => return Err(ResolveError::Io { path: joined, source }),
        };
        if !resolved.starts_with(&self.root) {
            return Err(ResolveError::Forbidden);
        }

        let metadata = tokio::fs::metadata(&resolved).await.map_err(|source| ResolveError::Io {
            path: resolved.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Ok(Resolution::File(resolved));
        }

        let Ok(index) = tokio::fs::canonicalize(resolved.join(SHELL_FILE)).await else {
            return Ok(Resolution::Shell);
        };
        if !index.starts_with(&self.root) {
            return Err(ResolveError::Forbidden);
        }
        match tokio::fs::metadata(&index).await {
            Ok(metadata) if metadata.is_file() => Ok(Resolution::File(index)),
            _ => Ok(Resolution::Shell),
        }
    }

    /// Answer a static request.
    pub async fn serve(&self, request: Request) -> Response {
        if !matches!(*request.method(), Method::GET | Method::HEAD) {
            return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
        }

        let path = match self.resolve(request.uri().path()).await {
            Ok(Resolution::Shell) => self.shell.clone(),
            Ok(Resolution::File(path)) => path,
            Err(ResolveError::Forbidden) => {
                tracing::warn!(path = %request.uri().path(), "Static path outside root");
                return (StatusCode::FORBIDDEN, "Forbidden").into_response();
            }
            Err(e) => {
                tracing::error!(error = %e, "Static resolution failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
            }
        };

        let content_type = mime_guess::from_path(&path).first_raw();
        let mut response = match ServeFile::new(&path).oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(infallible) => match infallible {},
        };

        if let Some(content_type) = content_type {
            if response.status().is_success() {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }
        response
    }
}
