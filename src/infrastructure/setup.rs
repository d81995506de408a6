//! Project initialization and adapter wiring
//!
//! Handles:
//! - Configuration directory and default config file creation
//! - Building the reqwest transport and incident adapter from [`AppConfig`]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use crate::adapters::servicenow::ServiceNowIncidentService;
use crate::domain::models::{AppConfig, AuthMethod};
use crate::domain::ports::{HttpTransport, IncidentService};
use crate::infrastructure::config::CONFIG_DIR;
use crate::infrastructure::http::{
    ReqwestTransport, ReqwestTransportConfig, TransportAuth, UsageCollector,
};

/// Default configuration template content
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# snowbridge configuration
# Override settings by editing this file, adding .snowbridge/local.yaml,
# or setting environment variables with the SNOWBRIDGE_ prefix
#
# Example environment variables:
#   export SNOWBRIDGE_SERVICENOW__CONNECTION__API_URL=https://dev123.service-now.com
#   export SNOWBRIDGE_SERVICENOW__SECRETS__PASSWORD=...
#   export SNOWBRIDGE_HTTP__MAX_RETRIES=5
#   export SNOWBRIDGE_LOGGING__LEVEL=debug

servicenow:
  # Connector type: itsm, sir, itom
  connector: itsm

  connection:
    # Instance base URL
    api_url: ""

    # Force the Table API even for connectors that prefer Import Set
    uses_table_api: false

    # OAuth instead of basic auth (requires client_id, jwt_key_id,
    # user_identifier_value and the client_secret/private_key secrets)
    is_oauth: false

  # Keep secrets in .snowbridge/local.yaml or environment variables
  secrets:
    username: ""
    password: ""

# HTTP transport
http:
  # Request timeout in seconds
  timeout_secs: 60

  # Requests per second allowed
  requests_per_second: 10.0

  # Retry policy for 429, 5xx, network errors and timeouts
  max_retries: 3
  initial_backoff_ms: 1000
  max_backoff_ms: 30000

# Logging configuration (written to stderr)
logging:
  # Log level: trace, debug, info, warn, error
  level: "warn"

  # Log format: json, pretty
  format: "pretty"
"#;

/// Setup paths and directories
#[derive(Debug, Clone)]
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl SetupPaths {
    /// Get setup paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::in_dir(current_dir))
    }

    /// Setup paths rooted at `root`
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        let config_dir = root.as_ref().join(CONFIG_DIR);
        Self {
            config_file: config_dir.join("config.yaml"),
            config_dir,
        }
    }

    /// Check if a config file already exists
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}

/// Create the configuration directory
pub fn create_config_dir(paths: &SetupPaths) -> Result<()> {
    fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")
}

/// Write the default configuration file
///
/// Returns false without touching an existing file unless `force` is set.
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<bool> {
    if paths.config_file.exists() && !force {
        return Ok(false);
    }

    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE)
        .context("Failed to write config file")?;

    Ok(true)
}

/// Resolve transport authentication from validated credentials
fn transport_auth(config: &AppConfig) -> Result<TransportAuth> {
    let settings = &config.servicenow;
    match settings.credentials().validate()? {
        AuthMethod::Basic { username, password } => Ok(TransportAuth::Basic { username, password }),
        AuthMethod::OAuth { client_id } => settings
            .access_token
            .clone()
            .filter(|token| !token.is_empty())
            .map(TransportAuth::Bearer)
            .ok_or_else(|| {
                anyhow!(
                    "OAuth client {client_id} requires servicenow.access_token; \
                     token exchange is not performed"
                )
            }),
    }
}

/// Build the reqwest transport for `config`
pub fn build_transport(
    config: &AppConfig,
    usage: Option<Arc<UsageCollector>>,
) -> Result<Arc<dyn HttpTransport>> {
    let auth = transport_auth(config)?;
    let mut transport = ReqwestTransport::new(ReqwestTransportConfig::new(auth, &config.http))
        .context("Failed to build HTTP transport")?;
    if let Some(usage) = usage {
        transport = transport.with_usage_collector(usage);
    }
    Ok(Arc::new(transport))
}

/// Build the incident adapter for the configured instance and connector
pub fn build_incident_service(
    config: &AppConfig,
    usage: Option<Arc<UsageCollector>>,
) -> Result<Arc<dyn IncidentService>> {
    let transport = build_transport(config, usage)?;
    let service = ServiceNowIncidentService::new(
        &config.servicenow.credentials(),
        &config.servicenow.service_config(),
        transport,
    )?;

    info!(connector = ?config.servicenow.connector, "Incident service ready");
    Ok(Arc::new(service))
}
