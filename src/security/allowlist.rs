//! Outbound host allow-list.
//!
//! Hosts are compared as `host[:port]` authorities, ASCII
//! case-insensitively, with no suffix or wildcard matching.

use url::Url;

/// Authority of `url` as `host[:port]`.
///
/// The port is included only when it is explicit and not the scheme's
/// default. Returns `None` for URLs without a host.
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Whether `host` exactly matches an entry of `allowed`.
pub fn is_allowed(allowed: &[String], host: &str) -> bool {
    !host.is_empty() && allowed.iter().any(|entry| entry.eq_ignore_ascii_case(host))
}
