//! Port trait definitions (Hexagonal Architecture)
//!
//! - `HttpTransport`: issues requests against the remote instance
//! - `IncidentService`: the incident operation set exposed to callers

pub mod incident_service;
pub mod transport;

pub use incident_service::IncidentService;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
