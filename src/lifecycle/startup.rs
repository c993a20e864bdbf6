//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate the static directory and its shell document
//! - Load the runtime config record from the static directory
//! - Build the outbound client and assemble `AppState`
//!
//! # Design Decisions
//! - Fail fast: a missing static directory or shell is fatal
//! - A malformed config file is not fatal; the store reports it and
//!   starts from the empty record

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::assets::resolver::SHELL_FILE;
use crate::assets::SpaResolver;
use crate::config::{ConfigStore, EdgeSettings};
use crate::http::AppState;
use crate::proxy::{OutboundClient, OutboundTimeouts, ProxyError};
use crate::security::OriginValidator;

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid static directory {path}: {source}")]
    StaticDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Static directory not found: {0}")]
    MissingStaticDir(PathBuf),
    #[error("index.html not found in: {0}")]
    MissingShell(PathBuf),
    #[error(transparent)]
    Outbound(#[from] ProxyError),
}

/// Absolute static directory, checked to exist and hold the shell.
pub async fn static_root(dir: &Path) -> Result<PathBuf, StartupError> {
    let dir = std::path::absolute(dir).map_err(|source| StartupError::StaticDir {
        path: dir.to_path_buf(),
        source,
    })?;

    match tokio::fs::metadata(&dir).await {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Err(StartupError::MissingStaticDir(dir)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StartupError::MissingStaticDir(dir)),
        Err(source) => return Err(StartupError::StaticDir { path: dir, source }),
    }

    match tokio::fs::metadata(dir.join(SHELL_FILE)).await {
        Ok(metadata) if metadata.is_file() => Ok(dir),
        _ => Err(StartupError::MissingShell(dir)),
    }
}

/// Build the shared state for `settings`.
pub async fn prepare(settings: &EdgeSettings) -> Result<AppState, StartupError> {
    let root = static_root(&settings.static_dir).await?;
    let assets = SpaResolver::new(&root).map_err(|source| StartupError::StaticDir {
        path: root.clone(),
        source,
    })?;

    let config = ConfigStore::load(root.join(CONFIG_FILE)).await;
    let outbound = OutboundClient::new(settings.upload_endpoint.clone(), OutboundTimeouts::default())?;

    tracing::info!(
        static_dir = %root.display(),
        config_file = %config.path().display(),
        upload_endpoint = %settings.upload_endpoint,
        "Startup complete"
    );

    Ok(AppState {
        config: Arc::new(config),
        assets: Arc::new(assets),
        origins: OriginValidator::default(),
        outbound: Arc::new(outbound),
    })
}
