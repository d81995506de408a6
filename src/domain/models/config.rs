use serde::{Deserialize, Serialize};

use super::connection::{ConnectionConfig, Credentials, Secrets, ServiceConfig};

/// Main configuration structure for snowbridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    /// Remote instance and connector selection
    #[serde(default)]
    pub servicenow: ServiceNowSettings,

    /// HTTP transport tuning
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which incident table family the adapter talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// IT Service Management
    #[default]
    Itsm,
    /// Security Incident Response
    Sir,
    /// IT Operations Management
    Itom,
}

impl ConnectorKind {
    /// Service configuration for this connector
    pub fn service_config(self) -> ServiceConfig {
        match self {
            Self::Itsm => ServiceConfig::itsm(),
            Self::Sir => ServiceConfig::sir(),
            Self::Itom => ServiceConfig::itom(),
        }
    }
}

/// ServiceNow connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServiceNowSettings {
    /// Non-secret connection parameters
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Secret connection parameters
    #[serde(default)]
    pub secrets: Secrets,

    /// Connector type
    #[serde(default)]
    pub connector: ConnectorKind,

    /// Pre-issued OAuth access token, sent as a bearer token
    #[serde(default)]
    pub access_token: Option<String>,
}

impl ServiceNowSettings {
    /// Credentials for adapter construction
    pub fn credentials(&self) -> Credentials {
        Credentials {
            config: self.connection.clone(),
            secrets: self.secrets.clone(),
        }
    }

    /// Service configuration for the selected connector
    pub fn service_config(&self) -> ServiceConfig {
        self.connector.service_config()
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Maximum retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_requests_per_second() -> f64 {
    10.0
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1_000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
