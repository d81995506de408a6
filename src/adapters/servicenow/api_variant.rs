//! Table API and Import Set API write strategies.
//!
//! The variant is selected once when the adapter is built. Every
//! mutating operation asks the variant where to send the request, how to
//! shape the body, and how to read the new `sys_id` back out of the
//! response, so the two result shapes never escape this module.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::errors::{IncidentError, IncidentResult};
use crate::domain::models::IncidentPayload;
use crate::domain::ports::{HttpMethod, HttpResponse};

use super::payload::{import_set_body, reject_additional_fields, table_api_body};
use super::urls::EndpointUrls;
use super::validator::throw_if_import_set_error;

/// Body member that tells the Import Set transform which record to update.
pub const ELASTIC_INCIDENT_ID: &str = "elastic_incident_id";

/// Write strategy for one API variant.
pub trait ApiVariant: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// True for the Table API.
    fn uses_table_api(&self) -> bool;

    /// Whether writes need the scoped application to be installed.
    fn requires_application(&self) -> bool {
        !self.uses_table_api()
    }

    /// Where new incidents are posted.
    fn create_url(&self) -> String;

    /// Where updates for `incident_id` are sent.
    fn update_url(&self, incident_id: &str) -> String;

    /// Method used for updates.
    fn update_method(&self) -> HttpMethod;

    /// Reject payloads this variant cannot write.
    fn check_payload(&self, payload: &IncidentPayload) -> IncidentResult<()>;

    /// Body for a create.
    fn create_body(&self, payload: IncidentPayload) -> Value;

    /// Body for an update of `incident_id`.
    fn update_body(&self, incident_id: &str, payload: IncidentPayload) -> Value;

    /// `sys_id` of the written record, validating variant-specific errors.
    fn extract_sys_id(&self, response: &HttpResponse) -> IncidentResult<String>;
}

/// Writes through `/api/now/v2/table/{table}`.
#[derive(Debug, Clone)]
pub struct TableApi {
    urls: EndpointUrls,
}

impl TableApi {
    /// Strategy for the given endpoints.
    pub fn new(urls: &EndpointUrls) -> Self {
        Self { urls: urls.clone() }
    }
}

impl ApiVariant for TableApi {
    fn name(&self) -> &'static str {
        "table"
    }

    fn uses_table_api(&self) -> bool {
        true
    }

    fn create_url(&self) -> String {
        self.urls.table_api_url().to_string()
    }

    fn update_url(&self, incident_id: &str) -> String {
        self.urls.incident_url(incident_id)
    }

    fn update_method(&self) -> HttpMethod {
        HttpMethod::Patch
    }

    fn check_payload(&self, payload: &IncidentPayload) -> IncidentResult<()> {
        reject_additional_fields(payload)
    }

    fn create_body(&self, payload: IncidentPayload) -> Value {
        table_api_body(payload)
    }

    fn update_body(&self, _incident_id: &str, payload: IncidentPayload) -> Value {
        table_api_body(payload)
    }

    fn extract_sys_id(&self, response: &HttpResponse) -> IncidentResult<String> {
        response
            .result()
            .and_then(|result| result.get("sys_id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                IncidentError::Decode("Table API response is missing result.sys_id".to_string())
            })
    }
}

/// Writes through `/api/now/import/{import_set_table}`. POST only.
#[derive(Debug, Clone)]
pub struct ImportSetApi {
    import_set_url: String,
}

impl ImportSetApi {
    /// Strategy for the given endpoints.
    pub fn new(urls: &EndpointUrls) -> Self {
        Self {
            import_set_url: urls.import_set_url().to_string(),
        }
    }
}

impl ApiVariant for ImportSetApi {
    fn name(&self) -> &'static str {
        "import_set"
    }

    fn uses_table_api(&self) -> bool {
        false
    }

    fn create_url(&self) -> String {
        self.import_set_url.clone()
    }

    fn update_url(&self, _incident_id: &str) -> String {
        self.import_set_url.clone()
    }

    fn update_method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn check_payload(&self, _payload: &IncidentPayload) -> IncidentResult<()> {
        Ok(())
    }

    fn create_body(&self, payload: IncidentPayload) -> Value {
        import_set_body(payload)
    }

    fn update_body(&self, incident_id: &str, payload: IncidentPayload) -> Value {
        let mut body = import_set_body(payload);
        if let Value::Object(map) = &mut body {
            map.insert(
                ELASTIC_INCIDENT_ID.to_string(),
                Value::String(incident_id.to_string()),
            );
        }
        body
    }

    fn extract_sys_id(&self, response: &HttpResponse) -> IncidentResult<String> {
        throw_if_import_set_error(response)?.sys_id.ok_or_else(|| {
            IncidentError::Decode("Import Set API record is missing sys_id".to_string())
        })
    }
}

/// Pick the variant for the resolved API mode.
pub fn select(uses_table_api: bool, urls: &EndpointUrls) -> Arc<dyn ApiVariant> {
    if uses_table_api {
        Arc::new(TableApi::new(urls))
    } else {
        Arc::new(ImportSetApi::new(urls))
    }
}
