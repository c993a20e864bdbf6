//! Request origin validation for the outbound endpoints.
//!
//! # Responsibilities
//! - Decide whether a request was issued by a page served from this host
//! - Tolerate preview/staging hosts of the same deployment via a pluggable
//!   related-origin rule
//!
//! # Design Decisions
//! - Requests without Origin and Referer are denied
//! - Origin is checked before Referer; a header that does not parse to a
//!   host (such as `Origin: null`) is skipped, not trusted
//! - This is an anti-forgery heuristic, not authentication

use std::fmt::Debug;
use std::sync::Arc;

use axum::http::{header, HeaderMap, Uri};
use url::Url;

use crate::security::allowlist::authority;

/// Decides whether a candidate host belongs to the same deployment as the
/// host a request was addressed to.
pub trait RelatedOrigin: Send + Sync + Debug {
    fn is_related(&self, request_host: &str, candidate_host: &str) -> bool;
}

/// Accepts only exact host matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactOnly;

impl RelatedOrigin for ExactOnly {
    fn is_related(&self, _request_host: &str, _candidate_host: &str) -> bool {
        false
    }
}

/// Matches hosts of one hosting provider by their deployment slug.
///
/// The slug is what remains after stripping a default port and one of the
/// provider suffixes, reduced to its last hyphen-delimited segment.
#[derive(Debug, Clone)]
pub struct HostingSlugMatcher {
    suffixes: Vec<String>,
}

impl HostingSlugMatcher {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(|s| s.into().to_ascii_lowercase()).collect(),
        }
    }

    /// Suffixes used by Replit deployments.
    pub fn replit() -> Self {
        Self::new([".replit.dev", ".replit.app", ".repl.co", ".replit.co"])
    }

    /// Deployment slug of `host`, if it is under a known suffix.
    pub fn slug(&self, host: &str) -> Option<String> {
        let host = host.to_ascii_lowercase();
        let host = host
            .strip_suffix(":443")
            .or_else(|| host.strip_suffix(":80"))
            .unwrap_or(host.as_str());

        let rest = self.suffixes.iter().find_map(|suffix| host.strip_suffix(suffix.as_str()))?;
        let slug = match rest.rsplit_once('-') {
            Some((_, last)) => last,
            None => rest,
        };
        (!slug.is_empty()).then(|| slug.to_string())
    }
}

impl Default for HostingSlugMatcher {
    fn default() -> Self {
        Self::replit()
    }
}

impl RelatedOrigin for HostingSlugMatcher {
    fn is_related(&self, request_host: &str, candidate_host: &str) -> bool {
        match (self.slug(request_host), self.slug(candidate_host)) {
            (Some(expected), Some(candidate)) => expected == candidate,
            _ => false,
        }
    }
}

/// Validates the Origin/Referer of requests against their Host.
#[derive(Debug, Clone)]
pub struct OriginValidator {
    related: Arc<dyn RelatedOrigin>,
}

impl OriginValidator {
    pub fn new(related: impl RelatedOrigin + 'static) -> Self {
        Self {
            related: Arc::new(related),
        }
    }

    /// Validate a request from its headers and URI.
    pub fn validate(&self, headers: &HeaderMap, uri: &Uri) -> bool {
        let origin = header_str(headers, header::ORIGIN);
        let referer = header_str(headers, header::REFERER);
        let host = request_host(headers, uri).unwrap_or_default();
        self.check(host, origin, referer)
    }

    /// Core decision over raw header values.
    pub fn check(&self, host: &str, origin: Option<&str>, referer: Option<&str>) -> bool {
        if origin.is_none() && referer.is_none() {
            return false;
        }

        for candidate in [origin, referer].into_iter().flatten() {
            let Some(candidate_host) = Url::parse(candidate).ok().and_then(|url| authority(&url)) else {
                continue;
            };
            if !host.is_empty() && candidate_host.eq_ignore_ascii_case(host) {
                return true;
            }
            if self.related.is_related(host, &candidate_host) {
                return true;
            }
        }

        false
    }
}

impl Default for OriginValidator {
    fn default() -> Self {
        Self::new(HostingSlugMatcher::default())
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Host the request was addressed to: the Host header, or the URI
/// authority for HTTP/2 requests.
pub fn request_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> Option<&'a str> {
    header_str(headers, header::HOST).or_else(|| uri.authority().map(|a| a.as_str()))
}
