//! Allow-list gate for outbound targets.
//!
//! Every outbound request passes through here before any network call.

use url::Url;

use crate::config::ConfigStore;
use crate::proxy::ProxyError;
use crate::security::allowlist::authority;

/// Parse a caller-supplied target URL. Only http and https are forwarded.
pub fn parse_target(raw: &str) -> Result<Url, ProxyError> {
    let url = Url::parse(raw).map_err(|_| ProxyError::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ProxyError::InvalidUrl),
    }
}

/// Parse `raw` and admit it only if its host is allow-listed.
pub async fn admit(store: &ConfigStore, raw: &str) -> Result<Url, ProxyError> {
    let url = parse_target(raw)?;
    let host = authority(&url).unwrap_or_default();
    if !store.is_host_allowed(&host).await {
        tracing::warn!(host = %host, "Proxy target not in whitelist");
        return Err(ProxyError::HostNotAllowed);
    }
    Ok(url)
}

/// Admit the configured upload endpoint.
pub async fn admit_upload(store: &ConfigStore, endpoint: &Url) -> Result<(), ProxyError> {
    let host = authority(endpoint).unwrap_or_default();
    if !store.is_host_allowed(&host).await {
        tracing::warn!(host = %host, "Upload host not in whitelist");
        return Err(ProxyError::UploadHostNotAllowed);
    }
    Ok(())
}
