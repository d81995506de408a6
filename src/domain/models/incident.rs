//! Incident domain models.
//!
//! These types are the normalized contract exposed by the adapter. Wire
//! shapes specific to one API variant live next to the adapter and never
//! leak past the response boundary.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// ServiceNow encodes the "Closed" incident state as the string `"7"`.
pub const CLOSED_STATE: &str = "7";

/// Close code written when an incident is closed by the caller.
pub const CLOSE_CODE: &str = "Closed/Resolved by Caller";

/// Close notes written when an incident is closed by the caller.
pub const CLOSE_NOTES: &str = "Closed by Caller";

/// An incident record as returned by the remote table.
///
/// Only the fields the adapter reasons about are typed; everything else
/// the table schema defines is kept in [`fields`](Incident::fields).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Primary key of the record.
    #[serde(default)]
    pub sys_id: String,

    /// Human readable ticket number (e.g. `INC0010001`).
    #[serde(default)]
    pub number: String,

    /// Incident state code.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,

    /// Creation timestamp, `YYYY-MM-DD HH:MM:SS` in UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_created_on: Option<String>,

    /// Last update timestamp, `YYYY-MM-DD HH:MM:SS` in UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_updated_on: Option<String>,

    /// Caller supplied correlation identifier.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub correlation_id: Option<String>,

    /// Remaining fields, as defined by the table schema.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Incident {
    /// True when the record is in the closed state.
    pub fn is_closed(&self) -> bool {
        self.state.as_deref() == Some(CLOSED_STATE)
    }

    /// True when the remote returned an empty record.
    pub fn is_empty(&self) -> bool {
        self.sys_id.trim().is_empty()
    }
}

/// Accept strings, numbers and null for fields ServiceNow usually sends as strings.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Fields to write to an incident.
///
/// `fields` holds the base incident fields (`short_description`,
/// `urgency`, `correlation_id`, ...). `additional_fields` holds extra
/// columns that are only accepted by the Import Set API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentPayload {
    /// Base incident fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// Extra columns written as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_fields: Option<Map<String, Value>>,
}

impl IncidentPayload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a base field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set an additional (non-base) field.
    #[must_use]
    pub fn with_additional_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.additional_fields
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Payload that moves an incident to the closed state.
    pub fn close() -> Self {
        Self::new()
            .with_field("state", CLOSED_STATE)
            .with_field("close_code", CLOSE_CODE)
            .with_field("close_notes", CLOSE_NOTES)
    }

    /// True when at least one additional field is set.
    pub fn has_additional_fields(&self) -> bool {
        self.additional_fields
            .as_ref()
            .is_some_and(|extra| !extra.is_empty())
    }
}

/// Normalized result of a write (create, update or close).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushedIncident {
    /// Ticket number.
    pub title: String,
    /// `sys_id` of the record.
    pub id: String,
    /// When the write took effect, RFC 3339 in UTC.
    pub pushed_date: String,
    /// Deep link for humans.
    pub url: String,
}

/// Selects the incident to close.
///
/// The incident id takes precedence when both are supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseIncidentParams {
    /// Correlation identifier supplied at creation time.
    #[serde(default)]
    pub correlation_id: Option<String>,
    /// Native `sys_id`.
    #[serde(default)]
    pub incident_id: Option<String>,
}

impl CloseIncidentParams {
    /// Close by native id.
    pub fn by_incident_id(id: impl Into<String>) -> Self {
        Self {
            correlation_id: None,
            incident_id: Some(id.into()),
        }
    }

    /// Close by correlation id.
    pub fn by_correlation_id(id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(id.into()),
            incident_id: None,
        }
    }
}

/// Information about the scoped application installed on the instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    /// Application name.
    #[serde(default)]
    pub name: String,
    /// Application scope.
    #[serde(default)]
    pub scope: String,
    /// Installed version.
    #[serde(default)]
    pub version: String,
}

/// A column of the incident table, used to render dynamic forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Display label.
    #[serde(default)]
    pub column_label: String,
    /// Column name.
    #[serde(default)]
    pub element: String,
    /// `"true"` when the column is mandatory.
    #[serde(default)]
    pub mandatory: String,
    /// Maximum length, as a decimal string.
    #[serde(default)]
    pub max_length: String,
}

/// A selectable value of a choice column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Stored value.
    #[serde(default)]
    pub value: String,
    /// Value of the parent choice this one depends on.
    #[serde(default)]
    pub dependent_value: String,
    /// Column the choice belongs to.
    #[serde(default)]
    pub element: String,
}
