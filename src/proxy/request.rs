//! Request descriptors accepted by the outbound endpoints.

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, HOST};
use reqwest::Method;
use serde::Deserialize;

use crate::proxy::ProxyError;

/// Body of `POST /api/proxy`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxyRequest {
    pub url: String,
    /// Defaults to GET when empty.
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ProxyRequest {
    pub fn method(&self) -> Result<Method, ProxyError> {
        if self.method.is_empty() {
            return Ok(Method::GET);
        }
        Method::from_bytes(self.method.as_bytes()).map_err(|_| ProxyError::InvalidMethod(self.method.clone()))
    }

    /// Caller-supplied headers. A later entry replaces an earlier one with
    /// the same name; `Host` always follows the target URL.
    pub fn header_map(&self) -> Result<HeaderMap, ProxyError> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| ProxyError::InvalidHeader(name.clone()))?;
            if name == HOST {
                continue;
            }
            let value = HeaderValue::from_str(value).map_err(|_| ProxyError::InvalidHeader(name.to_string()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

/// Body of `POST /api/imgbb`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UploadRequest {
    /// Base64 data, data URI, or URL of the image.
    pub image: String,
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// Seconds until the provider deletes the image; forwarded only when
    /// positive.
    pub expiration: i64,
}

impl UploadRequest {
    pub fn expiration(&self) -> Option<i64> {
        (self.expiration > 0).then_some(self.expiration)
    }
}
