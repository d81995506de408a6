//! Endpoint URL derivation.
//!
//! All URLs are computed from the configured base URL and table names.
//! Nothing here performs I/O.

use std::collections::BTreeMap;

use crate::domain::models::ServiceConfig;

/// Table holding the dictionary of column definitions.
pub const SYS_DICTIONARY_ENDPOINT: &str = "api/now/table/sys_dictionary";

/// Table holding choice values.
pub const SYS_CHOICE_ENDPOINT: &str = "api/now/table/sys_choice";

/// Endpoint URLs for one instance and service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointUrls {
    base: String,
    table: String,
    app_scope: String,
    table_api_url: String,
    import_set_url: String,
}

impl EndpointUrls {
    /// Derive the endpoint set. One trailing slash on `api_url` is dropped.
    pub fn new(api_url: &str, service: &ServiceConfig) -> Self {
        let base = api_url.strip_suffix('/').unwrap_or(api_url).to_string();
        let table_api_url = format!("{base}/api/now/v2/table/{}", service.table);
        let import_set_url = format!("{base}/api/now/import/{}", service.import_set_table);

        Self {
            base,
            table: service.table.clone(),
            app_scope: service.app_scope.clone(),
            table_api_url,
            import_set_url,
        }
    }

    /// Base URL without trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Table API collection URL of the incident table.
    pub fn table_api_url(&self) -> &str {
        &self.table_api_url
    }

    /// Import Set API staging table URL.
    pub fn import_set_url(&self) -> &str {
        &self.import_set_url
    }

    /// Table API URL of a single record. The id is percent-encoded.
    pub fn incident_url(&self, id: &str) -> String {
        format!("{}/{}", self.table_api_url, urlencoding::encode(id))
    }

    /// Deep link for humans. Not an API endpoint.
    pub fn view_url(&self, id: &str) -> String {
        format!("{}/nav_to.do?uri={}.do?sys_id={id}", self.base, self.table)
    }

    /// Query parameters selecting records that carry `correlation_id`,
    /// newest first. Sent against [`Self::table_api_url`] so the transport
    /// encodes the value.
    pub fn by_correlation_id_params(correlation_id: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(
            "sysparm_query".to_string(),
            format!("ORDERBYDESCsys_created_on^correlation_id={correlation_id}"),
        )])
    }

    /// Writable string columns of the table and its `task` parent.
    pub fn fields_url(&self) -> String {
        format!(
            "{}/{SYS_DICTIONARY_ENDPOINT}?sysparm_query=name=task^ORname={}^internal_type=string&active=true&array=false&read_only=false&sysparm_fields=max_length,element,column_label,mandatory",
            self.base, self.table
        )
    }

    /// Choice values for `fields`, OR-ed together.
    ///
    /// Returns `None` when `fields` is empty.
    pub fn choices_url(&self, fields: &[String]) -> Option<String> {
        let (first, rest) = fields.split_first()?;
        let elements = rest
            .iter()
            .fold(format!("element={first}"), |acc, field| {
                format!("{acc}^ORelement={field}")
            });

        Some(format!(
            "{}/{SYS_CHOICE_ENDPOINT}?sysparm_query=name=task^ORname={}^{elements}^language=en&sysparm_fields=label,value,dependent_value,element",
            self.base, self.table
        ))
    }

    /// Health endpoint of the scoped application.
    pub fn application_info_url(&self) -> String {
        format!("{}/api/{}/elastic_api/health", self.base, self.app_scope)
    }
}
