//! Shared configuration store.
//!
//! # Responsibilities
//! - Hold the live [`AppConfig`] for the process lifetime
//! - Hand out consistent snapshots to concurrent readers
//! - Apply partial updates exclusively and persist them
//!
//! # Design Decisions
//! - Readers share a `RwLock`; an update holds the write lock only while
//!   mutating, never while touching the disk
//! - Updates and their file writes are serialized by a separate mutex so
//!   the file always reflects the most recent update
//! - Persistence failures are logged; memory stays authoritative

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};

use crate::config::loader::{load_config, save_config, ConfigError, Loaded};
use crate::config::schema::AppConfig;
use crate::security::allowlist;

/// Live configuration record backed by a JSON file.
#[derive(Debug)]
pub struct ConfigStore {
    record: RwLock<AppConfig>,
    path: PathBuf,
    persist: Mutex<()>,
}

impl ConfigStore {
    /// Create a store with an explicit initial record.
    pub fn new(path: impl Into<PathBuf>, initial: AppConfig) -> Self {
        Self {
            record: RwLock::new(initial),
            path: path.into(),
            persist: Mutex::new(()),
        }
    }

    /// Load the store from `path`.
    ///
    /// A missing or unreadable file installs [`AppConfig::starter`]. A
    /// malformed file is reported here and leaves the empty record in place
    /// until the next successful update.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = match Self::read(&path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load config file");
                AppConfig::default()
            }
        };
        Self::new(path, initial)
    }

    async fn read(path: &Path) -> Result<AppConfig, ConfigError> {
        Ok(match load_config(path).await? {
            Loaded::File(config) => {
                tracing::info!(path = %path.display(), "Config file loaded");
                config
            }
            Loaded::Starter => {
                tracing::info!(path = %path.display(), "No config file, using starter config");
                AppConfig::starter()
            }
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current record.
    pub async fn get(&self) -> AppConfig {
        self.record.read().await.clone()
    }

    /// Apply a partial update, persist it, and return the new record.
    pub async fn update(&self, updates: &Map<String, Value>) -> AppConfig {
        let _persist = self.persist.lock().await;

        let snapshot = {
            let mut record = self.record.write().await;
            record.apply_partial(updates);
            record.clone()
        };

        self.persist(&snapshot).await;
        snapshot
    }

    async fn persist(&self, snapshot: &AppConfig) {
        match save_config(&self.path, snapshot).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Config persisted"),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to save config")
            }
        }
    }

    /// Whether `host` is on the outbound allow-list.
    pub async fn is_host_allowed(&self, host: &str) -> bool {
        let record = self.record.read().await;
        allowlist::is_allowed(&record.allowed_proxy_hosts, host)
    }
}
