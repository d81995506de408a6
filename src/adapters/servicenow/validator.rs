//! Response validation.
//!
//! ServiceNow reports some failures inside successful responses: a wrong
//! base URL can answer 200 with an HTML page or an empty body, and the
//! Import Set API reports per-record transform failures with status 201.

use serde::de::DeserializeOwned;

use crate::domain::errors::{IncidentError, IncidentResult};
use crate::domain::ports::HttpResponse;

use super::models::{ImportSetApiResponse, ImportSetRecord};

/// Fail when a success response carries no `result`.
pub fn check_instance(response: &HttpResponse) -> IncidentResult<()> {
    if (200..400).contains(&response.status) && response.result().is_none() {
        let host = response.host.as_deref().unwrap_or_default();
        return Err(IncidentError::Instance(format!(
            "There is an issue with your Service Now Instance. Please check {host}."
        )));
    }
    Ok(())
}

/// Return the authoritative Import Set record, failing on transform errors.
pub fn throw_if_import_set_error(response: &HttpResponse) -> IncidentResult<ImportSetRecord> {
    let body: ImportSetApiResponse = serde_json::from_value(response.data.clone())
        .map_err(|e| IncidentError::Instance(format!("Unexpected Import Set API response: {e}")))?;

    let record = body
        .result
        .into_iter()
        .next()
        .ok_or(IncidentError::EmptyResult)?;

    if record.is_error() {
        return Err(IncidentError::RemoteRecord(
            record.error_message.unwrap_or_default(),
        ));
    }

    Ok(record)
}

/// Decode the `result` member of a checked response.
pub fn decode_result<T: DeserializeOwned>(response: &HttpResponse) -> IncidentResult<T> {
    let result = response
        .result()
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    Ok(serde_json::from_value(result)?)
}
