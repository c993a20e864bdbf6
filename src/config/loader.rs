//! Configuration file I/O.

use std::path::Path;

use thiserror::Error;
use tokio::fs;

use crate::config::schema::AppConfig;

/// Error type for configuration loading and persistence.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Outcome of reading the configuration file at startup.
#[derive(Debug)]
pub enum Loaded {
    /// The file was read and parsed.
    File(AppConfig),
    /// The file was missing or unreadable; the starter record applies.
    Starter,
}

/// Read the configuration file.
///
/// Missing or unreadable files are not an error. A file that exists but
/// does not parse is.
pub async fn load_config(path: &Path) -> Result<Loaded, ConfigError> {
    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Config file not readable");
            return Ok(Loaded::Starter);
        }
    };

    let config = serde_json::from_slice(&content)?;
    Ok(Loaded::File(config))
}

/// Serialize the record as indented JSON.
pub fn render_config(config: &AppConfig) -> Result<Vec<u8>, ConfigError> {
    Ok(serde_json::to_vec_pretty(config)?)
}

/// Write the whole record to disk.
pub async fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let data = render_config(config)?;
    fs::write(path, data).await?;
    Ok(())
}
