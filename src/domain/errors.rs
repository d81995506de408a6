//! Domain errors for the incident adapter.

use serde_json::Value;
use thiserror::Error;

/// Fallback reason used when the remote system returned no error payload.
const UNKNOWN_REASON: &str = "unknown: errorResponse was null";

/// Errors raised by an [`HttpTransport`](crate::domain::ports::HttpTransport).
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The remote answered with a non-success status code.
    #[error("Request failed with status code {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Decoded response body (`Value::Null` when empty or not JSON).
        body: Value,
    },

    /// Connection, TLS or protocol level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timeout")]
    Timeout,

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request could not be built (bad header, bad URL, ...).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Returns true if this error is transient and the request may be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Network(_) | Self::Timeout => true,
            Self::Decode(_) | Self::InvalidRequest(_) => false,
        }
    }

    /// Returns true if retrying cannot change the outcome.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// HTTP status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Vendor-supplied failure reason extracted from the error body.
    ///
    /// ServiceNow encodes failures as
    /// `{"error": {"message": "...", "detail": "..."}, "status": "failure"}`.
    pub fn reason(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        let error = body.get("error")?;
        let message = error.get("message").and_then(Value::as_str);
        let detail = error.get("detail").and_then(Value::as_str);
        match (message, detail) {
            (Some(m), Some(d)) if !d.is_empty() => Some(format!("{m}: {d}")),
            (Some(m), _) => Some(m.to_string()),
            (None, Some(d)) => Some(d.to_string()),
            (None, None) => None,
        }
    }
}

/// Errors produced by incident adapter operations.
#[derive(Debug, Error)]
pub enum IncidentError {
    /// Missing or contradictory connection parameters.
    #[error("[Action][ServiceNow]: {0}")]
    Configuration(String),

    /// A required identifier was blank. No request was issued.
    #[error("{0}")]
    Validation(String),

    /// The remote answered with a success status but no `result`.
    #[error("{0}")]
    Instance(String),

    /// The Import Set API returned an empty result list.
    #[error("Unexpected result")]
    EmptyResult,

    /// The Import Set API reported a per-record failure.
    #[error("{0}")]
    RemoteRecord(String),

    /// The payload uses fields the selected API does not accept.
    #[error("{0}")]
    UnsupportedFields(String),

    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A successful response did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// An operation failed; wraps the underlying cause.
    #[error("{}", format_service_error(operation, source))]
    Service {
        /// Human readable operation description.
        operation: String,
        /// Underlying failure.
        #[source]
        source: Box<IncidentError>,
    },
}

/// Result alias for adapter operations.
pub type IncidentResult<T> = Result<T, IncidentError>;

fn format_service_error(operation: &str, source: &IncidentError) -> String {
    let reason = source
        .transport_reason()
        .unwrap_or_else(|| UNKNOWN_REASON.to_string());
    format!("[Action][ServiceNow]: {operation}. Error: {source} Reason: {reason}")
}

impl IncidentError {
    /// Wrap `self` as the cause of a failed operation.
    pub fn service(operation: impl Into<String>, source: Self) -> Self {
        Self::Service {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// HTTP status of the transport failure at the bottom of the chain.
    pub fn http_status(&self) -> Option<u16> {
        match self.root_cause() {
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// The innermost error, skipping `Service` wrappers.
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::Service { source, .. } = current {
            current = source;
        }
        current
    }

    /// Operation name when this is a `Service` error.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Service { operation, .. } => Some(operation),
            _ => None,
        }
    }

    fn transport_reason(&self) -> Option<String> {
        match self.root_cause() {
            Self::Transport(err) => err.reason(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for IncidentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transient_transport_errors() {
        assert!(TransportError::Status { status: 429, body: Value::Null }.is_transient());
        assert!(TransportError::Status { status: 503, body: Value::Null }.is_transient());
        assert!(TransportError::Network("reset".to_string()).is_transient());
        assert!(TransportError::Timeout.is_transient());
    }

    #[test]
    fn test_permanent_transport_errors() {
        assert!(TransportError::Status { status: 400, body: Value::Null }.is_permanent());
        assert!(TransportError::Status { status: 404, body: Value::Null }.is_permanent());
        assert!(TransportError::Decode("bad".to_string()).is_permanent());
    }

    #[test]
    fn test_reason_from_servicenow_body() {
        let err = TransportError::Status {
            status: 400,
            body: json!({"error": {"message": "Invalid table", "detail": "no such table"}, "status": "failure"}),
        };
        assert_eq!(err.reason().as_deref(), Some("Invalid table: no such table"));

        let err = TransportError::Status {
            status: 401,
            body: json!({"error": {"message": "User Not Authenticated", "detail": ""}}),
        };
        assert_eq!(err.reason().as_deref(), Some("User Not Authenticated"));
    }

    #[test]
    fn test_service_error_display_includes_reason() {
        let cause = IncidentError::Transport(TransportError::Status {
            status: 400,
            body: json!({"error": {"message": "An error occurred"}}),
        });
        let err = IncidentError::service("Unable to create incident", cause);
        assert_eq!(
            err.to_string(),
            "[Action][ServiceNow]: Unable to create incident. Error: Request failed with status code 400 Reason: An error occurred"
        );
    }

    #[test]
    fn test_service_error_display_without_reason() {
        let err = IncidentError::service("Unable to get fields", IncidentError::EmptyResult);
        assert_eq!(
            err.to_string(),
            "[Action][ServiceNow]: Unable to get fields. Error: Unexpected result Reason: unknown: errorResponse was null"
        );
    }

    #[test]
    fn test_root_cause_and_status_through_nested_wrappers() {
        let inner = IncidentError::service(
            "Unable to get incident with id abc",
            IncidentError::Transport(TransportError::Status { status: 404, body: Value::Null }),
        );
        let outer = IncidentError::service("Unable to close incident", inner);

        assert_eq!(outer.http_status(), Some(404));
        assert_eq!(outer.operation(), Some("Unable to close incident"));
        assert!(matches!(outer.root_cause(), IncidentError::Transport(_)));
    }
}
