//! Connection and service selection models.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{IncidentError, IncidentResult};

/// Non-secret connection parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectionConfig {
    /// Instance base URL, e.g. `https://dev123.service-now.com/`.
    #[serde(default)]
    pub api_url: String,

    /// Force the Table API even when the service prefers Import Set.
    #[serde(default)]
    pub uses_table_api: bool,

    /// Authenticate with OAuth instead of basic auth.
    #[serde(default)]
    pub is_oauth: bool,

    /// OAuth client id.
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth JWT key id.
    #[serde(default)]
    pub jwt_key_id: Option<String>,

    /// OAuth user identifier (the `sub` claim).
    #[serde(default)]
    pub user_identifier_value: Option<String>,
}

/// Secret connection parameters.
///
/// `Debug` never prints the values.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Secrets {
    /// Basic auth user.
    #[serde(default)]
    pub username: Option<String>,
    /// Basic auth password.
    #[serde(default)]
    pub password: Option<String>,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// OAuth private key (PEM).
    #[serde(default)]
    pub private_key: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: Option<&String>) -> &'static str {
            if value.is_some() {
                "[REDACTED]"
            } else {
                "None"
            }
        }

        f.debug_struct("Secrets")
            .field("username", &self.username)
            .field("password", &redact(self.password.as_ref()))
            .field("client_secret", &redact(self.client_secret.as_ref()))
            .field("private_key", &redact(self.private_key.as_ref()))
            .finish()
    }
}

/// How the transport should authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// HTTP basic auth.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// OAuth; the access token is obtained outside this crate.
    OAuth {
        /// OAuth client id.
        client_id: String,
    },
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::OAuth { client_id } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .finish(),
        }
    }
}

/// Connection configuration plus secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Non-secret parameters.
    #[serde(default)]
    pub config: ConnectionConfig,
    /// Secret parameters.
    #[serde(default)]
    pub secrets: Secrets,
}

fn present(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

impl Credentials {
    /// Build basic-auth credentials.
    pub fn basic(
        api_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            config: ConnectionConfig {
                api_url: api_url.into(),
                ..ConnectionConfig::default()
            },
            secrets: Secrets {
                username: Some(username.into()),
                password: Some(password.into()),
                ..Secrets::default()
            },
        }
    }

    /// Check that exactly one complete authentication method is configured.
    pub fn validate(&self) -> IncidentResult<AuthMethod> {
        let config = &self.config;
        let secrets = &self.secrets;

        if config.api_url.trim().is_empty() {
            return Err(wrong_configuration());
        }

        if config.is_oauth {
            let complete = present(secrets.client_secret.as_ref())
                && present(secrets.private_key.as_ref())
                && present(config.client_id.as_ref())
                && present(config.jwt_key_id.as_ref())
                && present(config.user_identifier_value.as_ref());
            if !complete {
                return Err(wrong_configuration());
            }
            return Ok(AuthMethod::OAuth {
                client_id: config.client_id.clone().unwrap_or_default(),
            });
        }

        match (&secrets.username, &secrets.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok(AuthMethod::Basic {
                    username: username.clone(),
                    password: password.clone(),
                })
            }
            _ => Err(wrong_configuration()),
        }
    }
}

fn wrong_configuration() -> IncidentError {
    IncidentError::Configuration("Wrong configuration.".to_string())
}

/// Which remote tables and which API variant the adapter targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServiceConfig {
    /// Table holding the incident records.
    pub table: String,
    /// Staging table used by the Import Set API.
    pub import_set_table: String,
    /// Prefer the Import Set API for writes.
    pub use_import_api: bool,
    /// Scope of the scoped application exposing the health endpoint.
    pub app_scope: String,
}

impl ServiceConfig {
    /// IT Service Management incidents.
    pub fn itsm() -> Self {
        Self {
            table: "incident".to_string(),
            import_set_table: "x_elas2_inc_int_elastic_incident".to_string(),
            use_import_api: true,
            app_scope: "x_elas2_inc_int".to_string(),
        }
    }

    /// Security Incident Response incidents.
    pub fn sir() -> Self {
        Self {
            table: "sn_si_incident".to_string(),
            import_set_table: "x_elas2_sir_int_elastic_si_incident".to_string(),
            use_import_api: true,
            app_scope: "x_elas2_sir_int".to_string(),
        }
    }

    /// IT Operations Management events. Table API only.
    pub fn itom() -> Self {
        Self {
            table: "em_event".to_string(),
            import_set_table: "x_elas2_inc_int_elastic_incident".to_string(),
            use_import_api: false,
            app_scope: "x_elas2_inc_int".to_string(),
        }
    }

    /// True when writes go through the Table API.
    ///
    /// Import Set is used only if the service enables it and the
    /// connection does not force the Table API.
    pub fn uses_table_api(&self, connection: &ConnectionConfig) -> bool {
        !self.use_import_api || connection.uses_table_api
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::itsm()
    }
}
