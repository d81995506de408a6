use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method, Response, Url, header};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::TransportError;
use crate::domain::models::HttpConfig;
use crate::domain::ports::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

use super::rate_limiter::TokenBucketRateLimiter;
use super::retry::RetryPolicy;
use super::usage::UsageCollector;

/// How requests are authenticated
#[derive(Clone)]
pub enum TransportAuth {
    /// HTTP basic authentication
    Basic {
        /// Account name
        username: String,
        /// Account password
        password: String,
    },
    /// OAuth access token sent as `Authorization: Bearer`
    Bearer(String),
}

impl fmt::Debug for TransportAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
        }
    }
}

impl TransportAuth {
    fn kind(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Bearer(_) => "bearer",
        }
    }
}

/// Configuration for [`ReqwestTransport`]
#[derive(Debug, Clone)]
pub struct ReqwestTransportConfig {
    /// Authentication applied to every request
    pub auth: TransportAuth,

    /// Rate limit in requests per second
    pub rate_limit_rps: f64,

    /// Maximum retry attempts
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    pub max_backoff_ms: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ReqwestTransportConfig {
    /// Transport settings from the `http` config section
    pub fn new(auth: TransportAuth, http: &HttpConfig) -> Self {
        Self {
            auth,
            rate_limit_rps: http.requests_per_second,
            max_retries: http.max_retries,
            initial_backoff_ms: http.initial_backoff_ms,
            max_backoff_ms: http.max_backoff_ms,
            timeout_secs: http.timeout_secs,
        }
    }
}

/// [`HttpTransport`] backed by reqwest
///
/// Provides:
/// - Connection pooling and reuse
/// - Rate limiting via token bucket algorithm
/// - Exponential backoff retry for transient failures
/// - Non-2xx responses mapped to [`TransportError::Status`]
pub struct ReqwestTransport {
    http_client: ReqwestClient,
    auth: TransportAuth,
    rate_limiter: TokenBucketRateLimiter,
    retry_policy: RetryPolicy,
    usage: Option<Arc<UsageCollector>>,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("auth", &self.auth)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Create a new transport
    pub fn new(config: ReqwestTransportConfig) -> Result<Self, TransportError> {
        info!(
            auth = config.auth.kind(),
            rate_limit_rps = config.rate_limit_rps,
            timeout_secs = config.timeout_secs,
            max_retries = config.max_retries,
            "Initializing ServiceNow HTTP transport"
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            auth: config.auth,
            rate_limiter: TokenBucketRateLimiter::new(config.rate_limit_rps),
            retry_policy: RetryPolicy::new(
                config.max_retries,
                config.initial_backoff_ms,
                config.max_backoff_ms,
            ),
            usage: None,
        })
    }

    /// Record outbound request volume into `usage`
    #[must_use]
    pub fn with_usage_collector(mut self, usage: Arc<UsageCollector>) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Execute a single attempt (called by retry logic)
    async fn execute_once(
        &self,
        method: Method,
        url: &Url,
        body: Option<&[u8]>,
    ) -> Result<HttpResponse, TransportError> {
        let mut builder = self.http_client.request(method.clone(), url.clone());
        builder = match &self.auth {
            TransportAuth::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
            TransportAuth::Bearer(token) => builder.bearer_auth(token),
        };
        if let Some(body) = body {
            builder = builder.body(body.to_vec());
        }

        if let Some(usage) = &self.usage {
            usage.record_request(body.map_or(0, |b| b.len() as u64));
        }

        debug!(%method, %url, "HTTP request");
        let response = builder.send().await.map_err(map_reqwest_error)?;
        handle_response(response, url.host_str().map(str::to_string)).await
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method))]
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = build_url(&request)?;
        let method = to_reqwest_method(request.method);
        let body = request
            .data
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| TransportError::InvalidRequest(format!("Invalid JSON body: {e}")))?;

        self.rate_limiter.acquire().await;

        let result = self
            .retry_policy
            .execute(|| self.execute_once(method.clone(), &url, body.as_deref()))
            .await;

        if let Err(err) = &result {
            warn!(url = %url, error = %err, "HTTP request failed");
        }
        result
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
    }
}

/// Parse the request URL and append its extra query parameters
fn build_url(request: &HttpRequest) -> Result<Url, TransportError> {
    let mut url = Url::parse(&request.url)
        .map_err(|e| TransportError::InvalidRequest(format!("Invalid URL {}: {e}", request.url)))?;
    if !request.params.is_empty() {
        url.query_pairs_mut().extend_pairs(request.params.iter());
    }
    Ok(url)
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

/// Convert a response into a typed result
///
/// Bodies that are empty or not JSON decode to `Value::Null` so that a
/// misconfigured base URL answering with HTML is caught by response
/// validation rather than here.
async fn handle_response(
    response: Response,
    host: Option<String>,
) -> Result<HttpResponse, TransportError> {
    let status = response.status();
    let text = response.text().await.map_err(map_reqwest_error)?;
    let data = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::Null)
    };

    debug!(status = status.as_u16(), "HTTP response");

    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: data,
        });
    }

    Ok(HttpResponse {
        status: status.as_u16(),
        data,
        host,
    })
}
