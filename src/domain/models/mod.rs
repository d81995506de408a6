//! Domain models.

pub mod config;
pub mod connection;
pub mod incident;

pub use config::{AppConfig, ConnectorKind, HttpConfig, ServiceNowSettings};
pub use connection::{AuthMethod, ConnectionConfig, Credentials, Secrets, ServiceConfig};
pub use incident::{
    ApplicationInfo, CLOSE_CODE, CLOSE_NOTES, CLOSED_STATE, Choice, CloseIncidentParams,
    FieldDefinition, Incident, IncidentPayload, PushedIncident,
};
