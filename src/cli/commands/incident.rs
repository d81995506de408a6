//! Implementation of the incident read and write commands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::cli::output::{CommandOutput, detail_table, table, truncate};
use crate::domain::models::{CloseIncidentParams, Incident, IncidentPayload, PushedIncident};
use crate::domain::ports::IncidentService;

/// Schema fields shown in the human incident view, when present
const DETAIL_FIELDS: &[&str] = &[
    "short_description",
    "description",
    "urgency",
    "impact",
    "severity",
    "category",
    "subcategory",
];

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Incident sys_id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Encoded query (sysparm_query), e.g. "active=true^priority=1"
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of records (sysparm_limit)
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Comma-separated columns to return (sysparm_fields)
    #[arg(long)]
    pub fields: Option<String>,

    /// Extra query parameter, repeatable
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,
}

impl FindArgs {
    /// Query parameters sent with the request
    pub fn into_params(self) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> = self.params.into_iter().collect();
        if let Some(query) = self.query {
            params.insert("sysparm_query".to_string(), query);
        }
        if let Some(limit) = self.limit {
            params.insert("sysparm_limit".to_string(), limit.to_string());
        }
        if let Some(fields) = self.fields {
            params.insert("sysparm_fields".to_string(), fields);
        }
        params
    }
}

#[derive(Args, Debug)]
pub struct ByCorrelationIdArgs {
    /// Correlation ID to look up
    pub correlation_id: String,
}

/// Fields written by create and update
#[derive(Args, Debug, Default)]
pub struct PayloadArgs {
    /// Base incident field, repeatable
    #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub fields: Vec<(String, String)>,

    /// Additional (non-base) field, repeatable. Import Set API only
    #[arg(short, long = "additional-field", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub additional_fields: Vec<(String, String)>,

    /// JSON or YAML file with base fields and an optional `additional_fields` object
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    /// Merge the file (if any) with the command-line fields
    ///
    /// Command-line fields override file fields.
    pub fn into_payload(self) -> Result<IncidentPayload> {
        let mut payload = match &self.file {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_yaml::from_str::<IncidentPayload>(&content)
                    .with_context(|| format!("Invalid incident payload in {}", path.display()))?
            }
            None => IncidentPayload::new(),
        };

        for (key, value) in self.fields {
            payload = payload.with_field(key, value);
        }
        for (key, value) in self.additional_fields {
            payload = payload.with_additional_field(key, value);
        }

        if payload.fields.is_empty() && !payload.has_additional_fields() {
            bail!("No fields given. Use --field KEY=VALUE or --file PATH");
        }
        Ok(payload)
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Incident sys_id
    pub id: String,

    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct CloseArgs {
    /// Incident sys_id; preferred over the correlation ID
    #[arg(long)]
    pub incident_id: Option<String>,

    /// Correlation ID of the incident
    #[arg(long)]
    pub correlation_id: Option<String>,
}

/// Parse a KEY=VALUE pair
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct IncidentOutput {
    pub incident: Incident,
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn opt(value: Option<&String>) -> String {
    value.cloned().unwrap_or_else(|| "-".to_string())
}

impl CommandOutput for IncidentOutput {
    fn to_human(&self) -> String {
        let incident = &self.incident;
        let mut rows = vec![
            ("Number", incident.number.clone()),
            ("Sys ID", incident.sys_id.clone()),
            ("State", opt(incident.state.as_ref())),
            ("Correlation ID", opt(incident.correlation_id.as_ref())),
            ("Created", opt(incident.sys_created_on.as_ref())),
            ("Updated", opt(incident.sys_updated_on.as_ref())),
        ];
        for name in DETAIL_FIELDS {
            if let Some(value) = incident.fields.get(*name).map(field_text) {
                if !value.is_empty() {
                    rows.push((*name, value));
                }
            }
        }
        detail_table(rows).to_string()
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct IncidentListOutput {
    pub incidents: Vec<Incident>,
}

impl CommandOutput for IncidentListOutput {
    fn to_human(&self) -> String {
        if self.incidents.is_empty() {
            return "No incidents found.".to_string();
        }

        let mut t = table(["Number", "Sys ID", "State", "Short description", "Updated"]);
        for incident in &self.incidents {
            let short_description = incident
                .fields
                .get("short_description")
                .map(field_text)
                .unwrap_or_default();
            t.add_row(vec![
                incident.number.clone(),
                incident.sys_id.clone(),
                opt(incident.state.as_ref()),
                truncate(&short_description, 50),
                opt(incident.sys_updated_on.as_ref()),
            ]);
        }
        format!("{t}\n{} incident(s)", self.incidents.len())
    }
}

#[derive(Debug, Serialize)]
pub struct CorrelationOutput {
    pub correlation_id: String,
    pub incident: Option<Incident>,
}

impl CommandOutput for CorrelationOutput {
    fn to_human(&self) -> String {
        match &self.incident {
            Some(incident) => IncidentOutput {
                incident: incident.clone(),
            }
            .to_human(),
            None => format!("No incident found with correlation ID {}", self.correlation_id),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct PushedOutput {
    pub pushed: PushedIncident,
}

impl CommandOutput for PushedOutput {
    fn to_human(&self) -> String {
        let pushed = &self.pushed;
        format!(
            "Pushed {} ({}) at {}\n{}",
            pushed.title, pushed.id, pushed.pushed_date, pushed.url
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct CloseOutput {
    pub closed: Option<PushedIncident>,
}

impl CommandOutput for CloseOutput {
    fn to_human(&self) -> String {
        match &self.closed {
            Some(pushed) => format!(
                "Closed {} ({}) at {}\n{}",
                pushed.title, pushed.id, pushed.pushed_date, pushed.url
            ),
            None => "No incident found. Nothing to close.".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub async fn get(service: &dyn IncidentService, args: GetArgs) -> Result<IncidentOutput> {
    let incident = service.get_incident(&args.id).await?;
    Ok(IncidentOutput { incident })
}

pub async fn find(service: &dyn IncidentService, args: FindArgs) -> Result<IncidentListOutput> {
    let incidents = service
        .find_incidents(args.into_params())
        .await?
        .unwrap_or_default();
    Ok(IncidentListOutput { incidents })
}

pub async fn by_correlation_id(
    service: &dyn IncidentService,
    args: ByCorrelationIdArgs,
) -> Result<CorrelationOutput> {
    let incident = service
        .get_incident_by_correlation_id(&args.correlation_id)
        .await?;
    Ok(CorrelationOutput {
        correlation_id: args.correlation_id,
        incident,
    })
}

pub async fn create(service: &dyn IncidentService, args: CreateArgs) -> Result<PushedOutput> {
    let payload = args.payload.into_payload()?;
    let pushed = service.create_incident(payload).await?;
    Ok(PushedOutput { pushed })
}

pub async fn update(service: &dyn IncidentService, args: UpdateArgs) -> Result<PushedOutput> {
    let payload = args.payload.into_payload()?;
    let pushed = service.update_incident(&args.id, payload).await?;
    Ok(PushedOutput { pushed })
}

pub async fn close(service: &dyn IncidentService, args: CloseArgs) -> Result<CloseOutput> {
    let closed = service
        .close_incident(CloseIncidentParams {
            correlation_id: args.correlation_id,
            incident_id: args.incident_id,
        })
        .await?;
    Ok(CloseOutput { closed })
}
