//! ServiceNow wire payloads.
//!
//! These structs map to the Import Set API JSON responses. They are
//! used internally by the adapter and are not part of the public domain
//! model.

use serde::{Deserialize, Serialize};

/// Per-record status reported by the Import Set API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSetStatus {
    /// A target record was created.
    Inserted,
    /// An existing target record was updated.
    Updated,
    /// The transform skipped the row.
    Ignored,
    /// The transform failed.
    Error,
    /// Any status this adapter does not know about.
    #[serde(other)]
    Other,
}

/// One transformed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSetRecord {
    /// Transform outcome.
    pub status: ImportSetStatus,
    /// `sys_id` of the target record.
    #[serde(default)]
    pub sys_id: Option<String>,
    /// Failure description when `status` is `error`.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Transform map that processed the row.
    #[serde(default)]
    pub transform_map: Option<String>,
    /// Target table.
    #[serde(default)]
    pub table: Option<String>,
    /// Display field name of the target table.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Display value of the target record (usually the ticket number).
    #[serde(default)]
    pub display_value: Option<String>,
    /// API link of the target record.
    #[serde(default)]
    pub record_link: Option<String>,
}

impl ImportSetRecord {
    /// True when the transform failed.
    pub fn is_error(&self) -> bool {
        self.status == ImportSetStatus::Error
    }
}

/// Body of an Import Set API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSetApiResponse {
    /// Transformed rows; the first one is authoritative.
    pub result: Vec<ImportSetRecord>,
}
