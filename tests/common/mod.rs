//! Common test utilities for integration tests
//!
//! Provides a scripted in-memory transport and adapter fixtures shared
//! across the integration test files.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use snowbridge::domain::models::{Credentials, ServiceConfig};
use snowbridge::{
    HttpRequest, HttpResponse, HttpTransport, ServiceNowIncidentService, TransportError,
};

pub const BASE_URL: &str = "https://dev123.service-now.com";
pub const TABLE_URL: &str = "https://dev123.service-now.com/api/now/v2/table/incident";
pub const IMPORT_SET_URL: &str =
    "https://dev123.service-now.com/api/now/import/x_elas2_inc_int_elastic_incident";
pub const HEALTH_URL: &str =
    "https://dev123.service-now.com/api/x_elas2_inc_int/elastic_api/health";

/// Transport that replays scripted responses and records every request
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new(responses: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Requests seen so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".to_string())))
    }
}

/// 200 response with `data` as body
pub fn ok(data: Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: 200,
        data,
        host: Some("dev123.service-now.com".to_string()),
    })
}

/// 201 response with `data` as body
pub fn created(data: Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: 201,
        data,
        host: Some("dev123.service-now.com".to_string()),
    })
}

/// Failed response with the given status and body
pub fn status_error(status: u16, body: Value) -> Result<HttpResponse, TransportError> {
    Err(TransportError::Status { status, body })
}

/// ServiceNow error body
pub fn servicenow_error(message: &str, detail: &str) -> Value {
    json!({
        "error": {"message": message, "detail": detail},
        "status": "failure"
    })
}

pub fn incident_record(sys_id: &str, number: &str, state: &str) -> Value {
    json!({
        "sys_id": sys_id,
        "number": number,
        "state": state,
        "short_description": "Disk full on db-01",
        "correlation_id": "alert-1",
        "sys_created_on": "2020-03-10 12:24:20",
        "sys_updated_on": "2020-03-10 12:25:00"
    })
}

pub fn incident_response(sys_id: &str, number: &str, state: &str) -> Result<HttpResponse, TransportError> {
    ok(json!({ "result": incident_record(sys_id, number, state) }))
}

pub fn application_response() -> Result<HttpResponse, TransportError> {
    ok(json!({
        "result": {"name": "Elastic", "scope": "x_elas2_inc_int", "version": "1.0.0"}
    }))
}

pub fn import_set_response(status: &str, sys_id: &str) -> Result<HttpResponse, TransportError> {
    created(json!({
        "import_set": "ISET0010001",
        "staging_table": "x_elas2_inc_int_elastic_incident",
        "result": [{
            "transform_map": "Elastic Incident",
            "table": "incident",
            "display_name": "number",
            "display_value": "INC0010001",
            "record_link": format!("{TABLE_URL}/{sys_id}"),
            "status": status,
            "sys_id": sys_id
        }]
    }))
}

/// Adapter writing through the Import Set API
pub fn import_set_service(transport: &Arc<FakeTransport>) -> ServiceNowIncidentService {
    ServiceNowIncidentService::new(
        &Credentials::basic(BASE_URL, "admin", "secret"),
        &ServiceConfig::itsm(),
        transport.clone(),
    )
    .unwrap()
}

/// Adapter writing through the Table API
pub fn table_service(transport: &Arc<FakeTransport>) -> ServiceNowIncidentService {
    let mut credentials = Credentials::basic(BASE_URL, "admin", "secret");
    credentials.config.uses_table_api = true;
    ServiceNowIncidentService::new(&credentials, &ServiceConfig::itsm(), transport.clone())
        .unwrap()
}
