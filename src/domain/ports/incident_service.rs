//! Incident service port.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::errors::IncidentResult;
use crate::domain::models::{
    ApplicationInfo, Choice, CloseIncidentParams, FieldDefinition, Incident, IncidentPayload,
    PushedIncident,
};

/// Operations offered over a remote incident table.
///
/// Every call is an independent round trip; implementations hold no
/// mutable state, so a single instance can be shared across tasks.
#[async_trait]
pub trait IncidentService: Send + Sync {
    /// Base URL of the instance, without trailing slash.
    fn base_url(&self) -> &str;

    /// Information about the scoped application on the instance.
    async fn get_application_info(&self) -> IncidentResult<ApplicationInfo>;

    /// Fetch one incident by `sys_id`.
    async fn get_incident(&self, id: &str) -> IncidentResult<Incident>;

    /// List incidents matching `params`; `None` when nothing matched.
    async fn find_incidents(
        &self,
        params: BTreeMap<String, String>,
    ) -> IncidentResult<Option<Vec<Incident>>>;

    /// Create an incident and return its canonical representation.
    async fn create_incident(&self, incident: IncidentPayload) -> IncidentResult<PushedIncident>;

    /// Update an incident and return its canonical representation.
    async fn update_incident(
        &self,
        incident_id: &str,
        incident: IncidentPayload,
    ) -> IncidentResult<PushedIncident>;

    /// Most recently created incident carrying `correlation_id`.
    async fn get_incident_by_correlation_id(
        &self,
        correlation_id: &str,
    ) -> IncidentResult<Option<Incident>>;

    /// Close an incident. `None` when no incident was found.
    async fn close_incident(
        &self,
        params: CloseIncidentParams,
    ) -> IncidentResult<Option<PushedIncident>>;

    /// Writable string columns of the incident table.
    async fn get_fields(&self) -> IncidentResult<Vec<FieldDefinition>>;

    /// Choice values for the given columns.
    async fn get_choices(&self, fields: &[String]) -> IncidentResult<Vec<Choice>>;
}
