//! Domain layer for the incident adapter.
//!
//! Contains the incident data model, the connection model, the error
//! taxonomy and the port traits implemented by adapters and
//! infrastructure.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{IncidentError, IncidentResult, TransportError};
