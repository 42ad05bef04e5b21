//! Trace record captured for one HTTP exchange.

use crate::context::{RequestInfo, ResponseInfo};
use serde::{Deserialize, Serialize};

/// Header name-value pair as stored in a trace record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Header name, as received
    pub name: String,
    /// Header value
    pub value: String,
}

impl TraceHeader {
    /// Create a new header entry.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Summary of one HTTP request/response exchange destined for a log sink.
///
/// Transformers receive the record by value and hand back the record the next
/// stage should see. By convention only `body_request` and `body_response`
/// are rewritten by transformers; the other fields describe the exchange and
/// are left as the interceptor captured them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraceRecord {
    /// Full request URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Response status code
    pub status_code: String,
    /// Request body as text
    pub body_request: String,
    /// Response body as text
    pub body_response: String,
    /// Request headers, in order
    pub header_request: Vec<TraceHeader>,
    /// Response headers, in order
    pub header_response: Vec<TraceHeader>,
    /// Label of the remote API this exchange belongs to
    pub api_name: String,
}

impl TraceRecord {
    /// Create a record for an exchange, with empty bodies and headers.
    pub fn new(
        url: impl Into<String>,
        method: impl Into<String>,
        status_code: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            status_code: status_code.into(),
            ..Default::default()
        }
    }

    /// Build a record from the request and response views and the captured bodies.
    pub fn from_exchange(
        api_name: impl Into<String>,
        request: &RequestInfo,
        response: &ResponseInfo,
        body_request: impl Into<String>,
        body_response: impl Into<String>,
    ) -> Self {
        Self {
            url: request.url.clone(),
            method: request.method.clone(),
            status_code: response.status.to_string(),
            body_request: body_request.into(),
            body_response: body_response.into(),
            header_request: request.headers.clone(),
            header_response: response.headers.clone(),
            api_name: api_name.into(),
        }
    }

    /// Set both bodies.
    pub fn with_bodies(
        mut self,
        body_request: impl Into<String>,
        body_response: impl Into<String>,
    ) -> Self {
        self.body_request = body_request.into();
        self.body_response = body_response.into();
        self
    }

    /// Set the request headers.
    pub fn with_request_headers(mut self, headers: Vec<TraceHeader>) -> Self {
        self.header_request = headers;
        self
    }

    /// Set the response headers.
    pub fn with_response_headers(mut self, headers: Vec<TraceHeader>) -> Self {
        self.header_response = headers;
        self
    }

    /// Set the API name label.
    pub fn with_api_name(mut self, api_name: impl Into<String>) -> Self {
        self.api_name = api_name.into();
        self
    }
}
