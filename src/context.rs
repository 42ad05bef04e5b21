//! Read-only request and response views handed to transformers.

use crate::record::TraceHeader;
use serde::{Deserialize, Serialize};

/// Request information for transformers and request predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestInfo {
    /// HTTP method
    pub method: String,
    /// Full request URL
    pub url: String,
    /// Request headers, in order
    pub headers: Vec<TraceHeader>,
}

/// Response information for transformers and response predicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseInfo {
    /// HTTP status code
    pub status: u16,
    /// Response headers, in order
    pub headers: Vec<TraceHeader>,
}

impl Default for ResponseInfo {
    fn default() -> Self {
        Self {
            status: 200,
            headers: vec![],
        }
    }
}

impl RequestInfo {
    /// Create request information without headers.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: vec![],
        }
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(TraceHeader::new(name, value));
        self
    }

    /// Get the first value of a header (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }
}

impl ResponseInfo {
    /// Create response information without headers.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: vec![],
        }
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(TraceHeader::new(name, value));
        self
    }

    /// Get the first value of a header (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }
}

fn first_header<'a>(headers: &'a [TraceHeader], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

fn collect_headers(headers: &http::HeaderMap) -> Vec<TraceHeader> {
    headers
        .iter()
        .map(|(name, value)| {
            TraceHeader::new(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

impl<B> From<&http::Request<B>> for RequestInfo {
    fn from(request: &http::Request<B>) -> Self {
        Self {
            method: request.method().as_str().to_string(),
            url: request.uri().to_string(),
            headers: collect_headers(request.headers()),
        }
    }
}

impl<B> From<&http::Response<B>> for ResponseInfo {
    fn from(response: &http::Response<B>) -> Self {
        Self {
            status: response.status().as_u16(),
            headers: collect_headers(response.headers()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = RequestInfo::new("GET", "https://api.example.com/users")
            .with_header("X-Custom", "custom-value")
            .with_header("Accept", "application/json");

        assert_eq!(request.header("x-custom"), Some("custom-value"));
        assert_eq!(request.header("ACCEPT"), Some("application/json"));
        assert_eq!(request.header("authorization"), None);
    }

    #[test]
    fn test_header_returns_first_value() {
        let response = ResponseInfo::new(200)
            .with_header("Set-Cookie", "a=1")
            .with_header("Set-Cookie", "b=2");

        assert_eq!(response.header("set-cookie"), Some("a=1"));
        assert_eq!(response.headers.len(), 2);
    }

    #[test]
    fn test_from_http_request() {
        let request = http::Request::builder()
            .method("PUT")
            .uri("https://api.example.com/items/4?dry_run=true")
            .header("content-type", "application/json")
            .body(())
            .unwrap();

        let info = RequestInfo::from(&request);
        assert_eq!(info.method, "PUT");
        assert_eq!(info.url, "https://api.example.com/items/4?dry_run=true");
        assert_eq!(info.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_from_http_response() {
        let response = http::Response::builder()
            .status(404)
            .header("x-trace", "skip")
            .body(())
            .unwrap();

        let info = ResponseInfo::from(&response);
        assert_eq!(info.status, 404);
        assert_eq!(info.header("X-Trace"), Some("skip"));
    }
}
