//! HTTP transport port.
//!
//! The adapter issues every remote call through this trait. Implementations
//! own authentication, retries, rate limiting and timeouts; the adapter
//! sees a single attempt that either produced a success response or failed.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::TransportError;

/// HTTP methods used against the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Read.
    Get,
    /// Create, or write through the Import Set API.
    Post,
    /// Partial update through the Table API.
    Patch,
}

impl HttpMethod {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Fully qualified URL, possibly already carrying a query string.
    pub url: String,
    /// Method.
    pub method: HttpMethod,
    /// JSON body.
    pub data: Option<Value>,
    /// Extra query parameters appended by the transport.
    pub params: BTreeMap<String, String>,
}

impl HttpRequest {
    fn new(method: HttpMethod, url: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            url: url.into(),
            method,
            data,
            params: BTreeMap::new(),
        }
    }

    /// GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url, None)
    }

    /// POST request with a JSON body.
    pub fn post(url: impl Into<String>, data: Value) -> Self {
        Self::new(HttpMethod::Post, url, Some(data))
    }

    /// Request with an explicit method.
    pub fn with_method(method: HttpMethod, url: impl Into<String>, data: Value) -> Self {
        Self::new(method, url, Some(data))
    }

    /// Attach query parameters.
    #[must_use]
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }
}

/// A response with a success status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Decoded JSON body (`Value::Null` when empty).
    pub data: Value,
    /// Host name of the remote, used in diagnostics.
    pub host: Option<String>,
}

impl HttpResponse {
    /// Response with status 200.
    pub fn ok(data: Value) -> Self {
        Self {
            status: 200,
            data,
            host: None,
        }
    }

    /// The `result` member of the body, if any and not null.
    pub fn result(&self) -> Option<&Value> {
        self.data.get("result").filter(|v| !v.is_null())
    }
}

/// Port for issuing HTTP requests against the remote instance.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute the request.
    ///
    /// Non-success statuses must be reported as
    /// [`TransportError::Status`] so callers can inspect the status code.
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
