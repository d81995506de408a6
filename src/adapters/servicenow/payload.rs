//! Request body shaping and timestamp normalization.

use chrono::{NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::domain::errors::{IncidentError, IncidentResult};
use crate::domain::models::IncidentPayload;

/// Prefix of the staging-table columns that mirror base incident fields.
pub const FIELD_PREFIX: &str = "u_";

/// Timestamp layout used by the Table API.
const SERVICENOW_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// Reject additional fields on the Table API.
pub fn reject_additional_fields(payload: &IncidentPayload) -> IncidentResult<()> {
    if payload.has_additional_fields() {
        return Err(IncidentError::UnsupportedFields(
            "ServiceNow additional fields are not supported for deprecated connectors.".to_string(),
        ));
    }
    Ok(())
}

/// Table API body: base fields as-is.
pub fn table_api_body(payload: IncidentPayload) -> Value {
    Value::Object(payload.fields)
}

/// Import Set API body: base fields prefixed with `u_`, additional fields
/// merged in unprefixed. Base fields win on collision.
pub fn import_set_body(payload: IncidentPayload) -> Value {
    let mut body: Map<String, Value> = payload.additional_fields.unwrap_or_default();
    for (key, value) in payload.fields {
        body.insert(format!("{FIELD_PREFIX}{key}"), value);
    }
    Value::Object(body)
}

/// Convert a ServiceNow timestamp to RFC 3339 (UTC, milliseconds).
///
/// Missing or unparsable timestamps resolve to the current time.
pub fn pushed_date(timestamp: Option<&str>) -> String {
    let parsed = timestamp
        .and_then(|ts| NaiveDateTime::parse_from_str(ts.trim(), SERVICENOW_DATETIME).ok())
        .map(|naive| naive.and_utc());

    parsed
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> IncidentPayload {
        IncidentPayload::new()
            .with_field("short_description", "title")
            .with_field("urgency", "1")
    }

    #[test]
    fn test_table_body_is_unprefixed() {
        let body = table_api_body(payload());
        assert_eq!(body, json!({"short_description": "title", "urgency": "1"}));
    }

    #[test]
    fn test_import_set_body_prefixes_base_fields() {
        let body = import_set_body(
            payload()
                .with_additional_field("custom_column", "x")
                .with_additional_field("u_urgency", "3"),
        );
        assert_eq!(
            body,
            json!({
                "u_short_description": "title",
                "u_urgency": "1",
                "custom_column": "x"
            })
        );
    }

    #[test]
    fn test_reject_additional_fields() {
        assert!(reject_additional_fields(&payload()).is_ok());
        let err = reject_additional_fields(&payload().with_additional_field("a", "b")).unwrap_err();
        assert!(matches!(err, IncidentError::UnsupportedFields(_)));
    }

    #[test]
    fn test_empty_additional_fields_are_accepted() {
        let mut p = payload();
        p.additional_fields = Some(Map::new());
        assert!(reject_additional_fields(&p).is_ok());
    }

    #[test]
    fn test_pushed_date_from_servicenow_timestamp() {
        assert_eq!(
            pushed_date(Some("2020-03-10 12:24:20")),
            "2020-03-10T12:24:20.000Z"
        );
    }

    #[test]
    fn test_pushed_date_falls_back_to_now() {
        let before = Utc::now();
        let date = pushed_date(None);
        let parsed = chrono::DateTime::parse_from_rfc3339(&date).unwrap();
        assert!(parsed.timestamp() >= before.timestamp());
        assert!(date.ends_with('Z'));

        assert!(pushed_date(Some("not a date")).ends_with('Z'));
    }
}
