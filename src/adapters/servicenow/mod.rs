//! ServiceNow incident adapter.
//!
//! Talks to the Table API (`/api/now/v2/table/{table}`) and the Import Set
//! API (`/api/now/import/{staging_table}`), normalizing both to the
//! [`IncidentService`](crate::domain::ports::IncidentService) contract.

pub mod api_variant;
pub mod models;
pub mod payload;
pub mod service;
pub mod urls;
pub mod validator;

pub use api_variant::{ApiVariant, ImportSetApi, TableApi};
pub use service::ServiceNowIncidentService;
pub use urls::EndpointUrls;
