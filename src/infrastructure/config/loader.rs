use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::AppConfig;

/// Project-local configuration directory
pub const CONFIG_DIR: &str = ".snowbridge";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ServiceNow API URL cannot be empty")]
    EmptyApiUrl,

    #[error("Invalid ServiceNow API URL: {0}. Must start with http:// or https://")]
    InvalidApiUrl(String),

    #[error("Incident table cannot be empty")]
    EmptyTable,

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid timeout: {0}. Must be at least 1 second")]
    InvalidTimeout(u64),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .snowbridge/config.yaml (project config, created by init)
    /// 3. .snowbridge/local.yaml (local overrides such as secrets, optional)
    /// 4. Environment variables (SNOWBRIDGE_* prefix, `__` separates sections)
    pub fn load() -> Result<AppConfig> {
        let config: AppConfig = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<AppConfig> {
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("SNOWBRIDGE_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        let dir = Path::new(CONFIG_DIR);
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("SNOWBRIDGE_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
        let api_url = config.servicenow.connection.api_url.trim();
        if api_url.is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(api_url.to_string()));
        }

        let service = config.servicenow.service_config();
        if service.table.is_empty() || (service.use_import_api && service.import_set_table.is_empty())
        {
            return Err(ConfigError::EmptyTable);
        }

        let http = &config.http;
        if !(http.requests_per_second > 0.0 && http.requests_per_second.is_finite()) {
            return Err(ConfigError::InvalidRateLimit(http.requests_per_second));
        }

        if http.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(http.timeout_secs));
        }

        if http.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(http.max_retries));
        }

        if http.initial_backoff_ms >= http.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                http.initial_backoff_ms,
                http.max_backoff_ms,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ConnectorKind;
    use std::io::Write;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.servicenow.connection.api_url = "https://dev123.service-now.com/".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.http.max_retries, 3);
        assert!((config.http.requests_per_second - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.servicenow.connector, ConnectorKind::Itsm);
        ConfigLoader::validate(&valid_config()).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
servicenow:
  connector: sir
  connection:
    api_url: https://dev123.service-now.com
    uses_table_api: true
  secrets:
    username: admin
    password: secret
http:
  timeout_secs: 30
  requests_per_second: 5.0
logging:
  level: debug
  format: json
";

        let config: AppConfig = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.servicenow.connector, ConnectorKind::Sir);
        assert!(config.servicenow.connection.uses_table_api);
        assert_eq!(config.servicenow.secrets.username.as_deref(), Some("admin"));
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_empty_api_url() {
        let result = ConfigLoader::validate(&AppConfig::default());
        assert!(matches!(result, Err(ConfigError::EmptyApiUrl)));
    }

    #[test]
    fn test_validate_api_url_scheme() {
        let mut config = valid_config();
        config.servicenow.connection.api_url = "dev123.service-now.com".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidApiUrl(_))
        ));
    }

    #[test]
    fn test_validate_rate_limit() {
        let mut config = valid_config();
        config.http.requests_per_second = 0.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRateLimit(_))
        ));
    }

    #[test]
    fn test_validate_zero_retries() {
        let mut config = valid_config();
        config.http.max_retries = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxRetries(0))
        ));
    }

    #[test]
    fn test_validate_backoff() {
        let mut config = valid_config();
        config.http.initial_backoff_ms = 5_000;
        config.http.max_backoff_ms = 5_000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(5_000, 5_000))
        ));
    }

    #[test]
    fn test_validate_log_level_and_format() {
        let mut config = valid_config();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));

        let mut config = valid_config();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "servicenow:\n  connection:\n    api_url: https://file.service-now.com\nhttp:\n  max_retries: 7"
        )
        .unwrap();

        let config = temp_env::with_vars_unset(
            [
                "SNOWBRIDGE_SERVICENOW__CONNECTION__API_URL",
                "SNOWBRIDGE_HTTP__MAX_RETRIES",
            ],
            || ConfigLoader::load_from_file(file.path()),
        )
        .unwrap();

        assert_eq!(
            config.servicenow.connection.api_url,
            "https://file.service-now.com"
        );
        assert_eq!(config.http.max_retries, 7);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "servicenow:\n  connection:\n    api_url: https://file.service-now.com"
        )
        .unwrap();

        let config = temp_env::with_vars(
            [
                (
                    "SNOWBRIDGE_SERVICENOW__CONNECTION__API_URL",
                    Some("https://env.service-now.com"),
                ),
                ("SNOWBRIDGE_SERVICENOW__CONNECTOR", Some("itom")),
                ("SNOWBRIDGE_HTTP__MAX_RETRIES", Some("5")),
            ],
            || ConfigLoader::load_from_file(file.path()),
        )
        .unwrap();

        assert_eq!(
            config.servicenow.connection.api_url,
            "https://env.service-now.com"
        );
        assert_eq!(config.servicenow.connector, ConnectorKind::Itom);
        assert_eq!(config.http.max_retries, 5);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http:\n  max_retries: 0").unwrap();

        let result = temp_env::with_vars(
            [(
                "SNOWBRIDGE_SERVICENOW__CONNECTION__API_URL",
                Some("https://env.service-now.com"),
            )],
            || ConfigLoader::load_from_file(file.path()),
        );
        assert!(result.is_err());
    }
}
