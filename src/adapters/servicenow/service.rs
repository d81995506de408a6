//! ServiceNow incident adapter.
//!
//! Implements [`IncidentService`] on top of an [`HttpTransport`]. Every
//! operation is a stateless sequence of round trips; writes are always
//! followed by a re-fetch so callers see the canonical record.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{IncidentError, IncidentResult};
use crate::domain::models::{
    ApplicationInfo, Choice, CloseIncidentParams, Credentials, FieldDefinition, Incident,
    IncidentPayload, PushedIncident, ServiceConfig,
};
use crate::domain::ports::{HttpRequest, HttpResponse, HttpTransport, IncidentService};

use super::api_variant::{self, ApiVariant};
use super::payload::pushed_date;
use super::urls::EndpointUrls;
use super::validator::{check_instance, decode_result};

/// Incident adapter for one ServiceNow instance and table.
#[derive(Clone)]
pub struct ServiceNowIncidentService {
    transport: Arc<dyn HttpTransport>,
    urls: EndpointUrls,
    variant: Arc<dyn ApiVariant>,
}

impl std::fmt::Debug for ServiceNowIncidentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceNowIncidentService")
            .field("urls", &self.urls)
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

impl ServiceNowIncidentService {
    /// Build an adapter.
    ///
    /// Fails with [`IncidentError::Configuration`] when the credentials do
    /// not describe exactly one complete authentication method.
    pub fn new(
        credentials: &Credentials,
        service: &ServiceConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> IncidentResult<Self> {
        credentials.validate()?;

        let urls = EndpointUrls::new(&credentials.config.api_url, service);
        let variant = api_variant::select(service.uses_table_api(&credentials.config), &urls);

        info!(
            base_url = urls.base(),
            table = %service.table,
            api = variant.name(),
            "ServiceNow incident adapter created"
        );

        Ok(Self {
            transport,
            urls,
            variant,
        })
    }

    /// True when writes go through the Table API.
    pub fn uses_table_api(&self) -> bool {
        self.variant.uses_table_api()
    }

    /// Endpoint URLs in use.
    pub fn urls(&self) -> &EndpointUrls {
        &self.urls
    }

    /// Verify the scoped application answers before writing through it.
    ///
    /// No-op on the Table API.
    pub async fn check_if_application_is_installed(&self) -> IncidentResult<()> {
        if !self.variant.requires_application() {
            return Ok(());
        }

        let ApplicationInfo { scope, version, .. } = self.get_application_info().await?;
        debug!(
            scope = %scope,
            version = %version,
            "Create incident: application scope and version"
        );
        Ok(())
    }

    /// Send a request and reject success responses without a `result`.
    async fn send(&self, request: HttpRequest) -> IncidentResult<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "ServiceNow request");
        let response = self.transport.request(request).await?;
        check_instance(&response)?;
        Ok(response)
    }

    fn pushed(&self, incident: &Incident, timestamp: Option<&str>) -> PushedIncident {
        PushedIncident {
            title: incident.number.clone(),
            id: incident.sys_id.clone(),
            pushed_date: pushed_date(timestamp),
            url: self.urls.view_url(&incident.sys_id),
        }
    }

    async fn fetch_application_info(&self) -> IncidentResult<ApplicationInfo> {
        let response = self
            .send(HttpRequest::get(self.urls.application_info_url()))
            .await?;
        decode_result(&response)
    }

    async fn fetch_incident(&self, id: &str) -> IncidentResult<Incident> {
        let response = self.send(HttpRequest::get(self.urls.incident_url(id))).await?;
        decode_result(&response)
    }

    async fn fetch_list<T: serde::de::DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> IncidentResult<Vec<T>> {
        let response = self.send(request).await?;
        decode_result(&response)
    }

    async fn try_create(&self, incident: IncidentPayload) -> IncidentResult<PushedIncident> {
        self.variant.check_payload(&incident)?;
        self.check_if_application_is_installed().await?;

        let request = HttpRequest::post(self.variant.create_url(), self.variant.create_body(incident));
        let response = self.send(request).await?;
        let sys_id = self.variant.extract_sys_id(&response)?;

        let inserted = self.get_incident(&sys_id).await?;
        Ok(self.pushed(&inserted, inserted.sys_created_on.as_deref()))
    }

    async fn try_update(
        &self,
        incident_id: &str,
        incident: IncidentPayload,
    ) -> IncidentResult<PushedIncident> {
        self.variant.check_payload(&incident)?;
        self.check_if_application_is_installed().await?;

        let request = HttpRequest::with_method(
            self.variant.update_method(),
            self.variant.update_url(incident_id),
            self.variant.update_body(incident_id, incident),
        );
        let response = self.send(request).await?;
        let sys_id = self.variant.extract_sys_id(&response)?;

        let updated = self.get_incident(&sys_id).await?;
        Ok(self.pushed(&updated, updated.sys_updated_on.as_deref()))
    }

    async fn try_close(
        &self,
        params: &CloseIncidentParams,
    ) -> IncidentResult<Option<PushedIncident>> {
        let CloseIncidentParams {
            correlation_id,
            incident_id,
        } = params;

        if correlation_id.is_none() && incident_id.is_none() {
            return Err(IncidentError::Validation(
                "No correlationId or incidentId found.".to_string(),
            ));
        }

        let incident_id = incident_id.as_deref().filter(|id| !id.is_empty());
        let correlation_id = correlation_id.as_deref().filter(|id| !id.is_empty());

        let found = match (incident_id, correlation_id) {
            (Some(id), _) => Some(self.get_incident(id).await?),
            (None, Some(cid)) => self.get_incident_by_correlation_id(cid).await?,
            (None, None) => None,
        };

        let Some(incident) = found.filter(|incident| !incident.is_empty()) else {
            warn!(
                correlation_id = ?correlation_id,
                incident_id = ?incident_id,
                "[ServiceNow][CloseIncident] No incident found"
            );
            return Ok(None);
        };

        if incident.is_closed() {
            warn!(
                correlation_id = ?correlation_id,
                incident_id = ?incident_id,
                "[ServiceNow][CloseIncident] Incident is already closed"
            );
            return Ok(Some(
                self.pushed(&incident, incident.sys_updated_on.as_deref()),
            ));
        }

        let closed = self
            .update_incident(&incident.sys_id, IncidentPayload::close())
            .await?;
        Ok(Some(closed))
    }
}

#[async_trait]
impl IncidentService for ServiceNowIncidentService {
    fn base_url(&self) -> &str {
        self.urls.base()
    }

    #[instrument(skip(self))]
    async fn get_application_info(&self) -> IncidentResult<ApplicationInfo> {
        self.fetch_application_info()
            .await
            .map_err(|e| IncidentError::service("Unable to get application version", e))
    }

    #[instrument(skip(self))]
    async fn get_incident(&self, id: &str) -> IncidentResult<Incident> {
        if id.trim().is_empty() {
            return Err(IncidentError::Validation("Incident id is empty.".to_string()));
        }

        self.fetch_incident(id)
            .await
            .map_err(|e| IncidentError::service(format!("Unable to get incident with id {id}"), e))
    }

    #[instrument(skip(self))]
    async fn find_incidents(
        &self,
        params: BTreeMap<String, String>,
    ) -> IncidentResult<Option<Vec<Incident>>> {
        let request = HttpRequest::get(self.urls.table_api_url()).with_params(params);
        let incidents: Vec<Incident> = self
            .fetch_list(request)
            .await
            .map_err(|e| IncidentError::service("Unable to find incidents by query", e))?;

        Ok(if incidents.is_empty() {
            None
        } else {
            Some(incidents)
        })
    }

    #[instrument(skip(self, incident))]
    async fn create_incident(&self, incident: IncidentPayload) -> IncidentResult<PushedIncident> {
        let pushed = self
            .try_create(incident)
            .await
            .map_err(|e| IncidentError::service("Unable to create incident", e))?;

        info!(incident_id = %pushed.id, number = %pushed.title, "Incident created");
        Ok(pushed)
    }

    #[instrument(skip(self, incident))]
    async fn update_incident(
        &self,
        incident_id: &str,
        incident: IncidentPayload,
    ) -> IncidentResult<PushedIncident> {
        let pushed = self.try_update(incident_id, incident).await.map_err(|e| {
            IncidentError::service(format!("Unable to update incident with id {incident_id}"), e)
        })?;

        info!(incident_id = %pushed.id, number = %pushed.title, "Incident updated");
        Ok(pushed)
    }

    #[instrument(skip(self))]
    async fn get_incident_by_correlation_id(
        &self,
        correlation_id: &str,
    ) -> IncidentResult<Option<Incident>> {
        if correlation_id.trim().is_empty() {
            return Err(IncidentError::Validation("Correlation ID is empty.".to_string()));
        }

        let request = HttpRequest::get(self.urls.table_api_url())
            .with_params(EndpointUrls::by_correlation_id_params(correlation_id));
        let incidents: Vec<Incident> = self.fetch_list(request).await.map_err(|e| {
            IncidentError::service(
                format!("Unable to get incident by correlation ID {correlation_id}"),
                e,
            )
        })?;

        Ok(incidents.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn close_incident(
        &self,
        params: CloseIncidentParams,
    ) -> IncidentResult<Option<PushedIncident>> {
        match self.try_close(&params).await {
            Ok(closed) => Ok(closed),
            Err(err) if err.http_status() == Some(404) => {
                warn!(
                    incident_id = ?params.incident_id,
                    "[ServiceNow][CloseIncident] No incident found with incidentId"
                );
                Ok(None)
            }
            Err(err) => Err(IncidentError::service("Unable to close incident", err)),
        }
    }

    #[instrument(skip(self))]
    async fn get_fields(&self) -> IncidentResult<Vec<FieldDefinition>> {
        self.fetch_list(HttpRequest::get(self.urls.fields_url()))
            .await
            .map_err(|e| IncidentError::service("Unable to get fields", e))
    }

    #[instrument(skip(self))]
    async fn get_choices(&self, fields: &[String]) -> IncidentResult<Vec<Choice>> {
        let Some(url) = self.urls.choices_url(fields) else {
            return Err(IncidentError::Validation(
                "At least one field is required to get choices.".to_string(),
            ));
        };

        self.fetch_list(HttpRequest::get(url))
            .await
            .map_err(|e| IncidentError::service("Unable to get choices", e))
    }
}
