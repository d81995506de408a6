//! Snowbridge - ServiceNow incident adapter
//!
//! Snowbridge reads, creates, updates and closes ServiceNow incidents
//! through either the Table API or the Import Set API of a scoped
//! integration application, and exposes the table schema and choice
//! lists needed to build incident forms.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Incident models, errors and ports
//! - **Adapters Layer** (`adapters`): The ServiceNow incident adapter
//! - **Infrastructure Layer** (`infrastructure`): HTTP transport, config, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use snowbridge::{ConfigLoader, IncidentService};
//! use snowbridge::infrastructure::setup::build_incident_service;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let service = build_incident_service(&config, None)?;
//!     let incident = service.get_incident("9c573169c611228700193229fff72400").await?;
//!     println!("{}", incident.number);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use adapters::servicenow::ServiceNowIncidentService;
pub use domain::errors::{IncidentError, IncidentResult, TransportError};
pub use domain::models::{
    AppConfig, ApplicationInfo, Choice, CloseIncidentParams, ConnectionConfig, Credentials,
    FieldDefinition, Incident, IncidentPayload, PushedIncident, Secrets, ServiceConfig,
};
pub use domain::ports::{HttpRequest, HttpResponse, HttpTransport, IncidentService};
pub use infrastructure::config::{ConfigError, ConfigLoader};
